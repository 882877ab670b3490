//! BMP encoder: uncompressed 24-bit, bottom-up unless `top_down` is set.

use crate::error::CodecError;
use crate::image::{BmpCompression, ColorType, FormatParams, Image};

use super::{PIXEL_DATA_OFFSET, PPM_72DPI, row_bytes};

/// Encode an RGB image as an uncompressed 24-bit BMP.
pub(super) fn encode_bmp(image: &Image) -> Result<Vec<u8>, CodecError> {
    if image.color_type != ColorType::Rgb || image.bit_depth != 8 {
        return Err(CodecError::UnsupportedFormat(format!(
            "BMP encode needs 8-bit Rgb, got {:?} at {} bits",
            image.color_type, image.bit_depth
        )));
    }
    let top_down = match &image.params {
        FormatParams::Bmp(params) => {
            if params.compression != BmpCompression::Rgb || params.bpp != 24 {
                return Err(CodecError::UnsupportedFormat(format!(
                    "BMP encode supports only uncompressed 24-bpp, got {:?}/{}-bpp",
                    params.compression, params.bpp
                )));
            }
            params.top_down
        }
        _ => false,
    };

    let w = image.width as usize;
    let h = image.height as usize;
    let src_row = row_bytes(image.width, 24);
    let pixel_data_size = src_row
        .checked_mul(h)
        .ok_or(CodecError::DimensionsTooLarge {
            width: image.width,
            height: image.height,
        })?;
    let file_size = pixel_data_size + PIXEL_DATA_OFFSET as usize;

    let mut out = Vec::with_capacity(file_size);
    write_header(&mut out, file_size, pixel_data_size, image, top_down);

    let pad = src_row - w * 3;
    for i in 0..h {
        let y = if top_down { i } else { h - 1 - i };
        let row = &image.pixels()[y * image.stride..y * image.stride + w * 3];
        for px in row.chunks_exact(3) {
            out.push(px[2]);
            out.push(px[1]);
            out.push(px[0]);
        }
        out.extend(std::iter::repeat_n(0u8, pad));
    }

    Ok(out)
}

fn write_header(
    out: &mut Vec<u8>,
    file_size: usize,
    pixel_data_size: usize,
    image: &Image,
    top_down: bool,
) {
    let height = if top_down {
        -(image.height as i32)
    } else {
        image.height as i32
    };

    // File header (14 bytes)
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // reserved
    out.extend_from_slice(&PIXEL_DATA_OFFSET.to_le_bytes());

    // BITMAPINFOHEADER (40 bytes)
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(image.width as i32).to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&PPM_72DPI.to_le_bytes());
    out.extend_from_slice(&PPM_72DPI.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors
}
