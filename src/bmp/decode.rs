//! BMP decoder for the uncompressed 24-bit profile.

use crate::error::CodecError;
use crate::image::{
    BmpCompression, BmpParams, ColorType, FormatParams, Image, ImageFormat, ImageInfo,
};
use crate::limits::Limits;

use super::row_bytes;

// ── Cursor for reading little-endian fields from &[u8] ──────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn get_u16_le(&mut self) -> Result<u16, CodecError> {
        if self.pos + 2 > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let val = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(val)
    }

    fn get_u32_le(&mut self) -> Result<u32, CodecError> {
        if self.pos + 4 > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let val = u32::from_le_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(val)
    }

    fn get_i32_le(&mut self) -> Result<i32, CodecError> {
        self.get_u32_le().map(|v| v as i32)
    }

    fn skip(&mut self, n: usize) -> Result<(), CodecError> {
        let new_pos = self.pos.checked_add(n).ok_or(CodecError::UnexpectedEof)?;
        if new_pos > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        self.pos = new_pos;
        Ok(())
    }
}

// ── Parsed header ───────────────────────────────────────────────────

struct BmpHeader {
    width: u32,
    height: u32,
    top_down: bool,
    bpp: u16,
    compression: BmpCompression,
    colors_used: u32,
    important_colors: u32,
    data_offset: u32,
}

fn parse_header(data: &[u8]) -> Result<BmpHeader, CodecError> {
    let mut cursor = Cursor::new(data);

    if data.len() < 2 || data[0] != b'B' || data[1] != b'M' {
        return Err(CodecError::Decode("missing BM signature".into()));
    }
    cursor.skip(2)?;
    let _file_size = cursor.get_u32_le()?;
    cursor.skip(4)?; // two reserved u16 fields
    let data_offset = cursor.get_u32_le()?;

    let header_size = cursor.get_u32_le()?;
    if header_size < 40 {
        return Err(CodecError::Decode(format!(
            "info header of {header_size} bytes, need BITMAPINFOHEADER"
        )));
    }
    let width = cursor.get_i32_le()?;
    let raw_height = cursor.get_i32_le()?;
    let planes = cursor.get_u16_le()?;
    let bpp = cursor.get_u16_le()?;
    let compression_raw = cursor.get_u32_le()?;
    let _image_size = cursor.get_u32_le()?;
    let _x_ppm = cursor.get_i32_le()?;
    let _y_ppm = cursor.get_i32_le()?;
    let colors_used = cursor.get_u32_le()?;
    let important_colors = cursor.get_u32_le()?;

    if width <= 0 {
        return Err(CodecError::Decode(format!("non-positive width {width}")));
    }
    if raw_height == 0 || raw_height == i32::MIN {
        return Err(CodecError::Decode(format!("bad height {raw_height}")));
    }
    if planes != 1 {
        return Err(CodecError::Decode(format!("planes = {planes}, expected 1")));
    }
    let compression = BmpCompression::from_u32(compression_raw)
        .ok_or_else(|| CodecError::Decode(format!("unknown compression {compression_raw}")))?;

    Ok(BmpHeader {
        width: width as u32,
        height: raw_height.unsigned_abs(),
        top_down: raw_height < 0,
        bpp,
        compression,
        colors_used,
        important_colors,
        data_offset,
    })
}

/// Header-only probe.
pub(super) fn probe_bmp(data: &[u8]) -> Result<ImageInfo, CodecError> {
    let header = parse_header(data)?;
    let color_type = if header.compression == BmpCompression::Rgb && header.bpp == 24 {
        ColorType::Rgb
    } else {
        ColorType::Unknown
    };
    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        format: ImageFormat::Bmp,
        color_type,
    })
}

/// Decode a BMP file into an RGB image.
pub(super) fn decode_bmp(data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
    let header = parse_header(data)?;

    if header.compression != BmpCompression::Rgb || header.bpp != 24 {
        return Err(CodecError::UnsupportedFormat(format!(
            "BMP {:?}/{}-bpp; only uncompressed 24-bpp is supported",
            header.compression, header.bpp
        )));
    }

    let w = header.width as usize;
    let h = header.height as usize;
    let src_row = row_bytes(header.width, 24);
    let stride = w
        .checked_mul(3)
        .ok_or(CodecError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    let out_len = stride
        .checked_mul(h)
        .ok_or(CodecError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    if let Some(limits) = limits {
        limits.admit(header.width, header.height, out_len)?;
    }

    let pixel_data = data
        .get(header.data_offset as usize..)
        .ok_or(CodecError::UnexpectedEof)?;
    let needed = src_row
        .checked_mul(h)
        .ok_or(CodecError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    if pixel_data.len() < needed {
        return Err(CodecError::UnexpectedEof);
    }

    let mut pixels = vec![0u8; out_len];
    for y in 0..h {
        let src_y = if header.top_down { y } else { h - 1 - y };
        let src = &pixel_data[src_y * src_row..src_y * src_row + w * 3];
        let dst = &mut pixels[y * stride..y * stride + w * 3];
        for (dst_px, src_px) in dst.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
            // disk order is BGR
            dst_px[0] = src_px[2];
            dst_px[1] = src_px[1];
            dst_px[2] = src_px[0];
        }
    }

    let mut image = Image::from_buffer(
        header.width,
        header.height,
        stride,
        ColorType::Rgb,
        8,
        ImageFormat::Bmp,
        pixels,
    );
    image.params = FormatParams::Bmp(BmpParams {
        compression: header.compression,
        bpp: header.bpp,
        colors_used: header.colors_used,
        important_colors: header.important_colors,
        top_down: header.top_down,
    });
    Ok(image)
}
