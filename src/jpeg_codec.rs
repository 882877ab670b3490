//! JPEG codec: decode via `jpeg-decoder`, encode via `jpeg-encoder`.
//!
//! Decode always lands on 8-bit RGB regardless of the file's internal
//! colorspace (the library converts JFIF YCbCr; grayscale and CMYK are
//! expanded here). Encode takes 8-bit RGB only.

use std::io::Cursor;
use std::path::Path;

use jpeg_encoder::SamplingFactor;

use crate::codec::ImageCodec;
use crate::error::CodecError;
use crate::image::{
    ColorType, FormatParams, Image, ImageFormat, ImageInfo, JpegParams, Subsampling,
};
use crate::limits::Limits;

pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError> {
        let mut decoder = jpeg::Decoder::new(Cursor::new(data));
        decoder.read_info()?;
        let info = decoder
            .info()
            .ok_or_else(|| CodecError::Decode("no JPEG header".into()))?;
        Ok(ImageInfo {
            width: u32::from(info.width),
            height: u32::from(info.height),
            format: ImageFormat::Jpeg,
            // decode always normalizes to RGB
            color_type: ColorType::Rgb,
        })
    }

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
        let mut decoder = jpeg::Decoder::new(Cursor::new(data));
        decoder.read_info()?;
        let info = decoder
            .info()
            .ok_or_else(|| CodecError::Decode("no JPEG header".into()))?;
        let width = u32::from(info.width);
        let height = u32::from(info.height);
        if width == 0 || height == 0 {
            return Err(CodecError::Decode(format!(
                "zero dimension: {width}x{height}"
            )));
        }
        if let Some(limits) = limits {
            limits.admit(width, height, width as usize * height as usize * 3)?;
        }

        let raw = decoder.decode()?;
        let pixels = to_rgb(raw, info.pixel_format)?;

        let stride = width as usize * 3;
        if pixels.len() != stride * height as usize {
            return Err(CodecError::Decode("truncated scanline data".into()));
        }

        Ok(Image::from_buffer(
            width,
            height,
            stride,
            ColorType::Rgb,
            8,
            ImageFormat::Jpeg,
            pixels,
        ))
    }

    fn encode(&self, image: &Image, _path: &Path) -> Result<Vec<u8>, CodecError> {
        if image.color_type != ColorType::Rgb || image.bit_depth != 8 {
            return Err(CodecError::UnsupportedFormat(format!(
                "JPEG encode needs 8-bit Rgb, got {:?} at {} bits",
                image.color_type, image.bit_depth
            )));
        }
        let params = match &image.params {
            FormatParams::Jpeg(params) => *params,
            _ => JpegParams::default(),
        };
        if params.quality == 0 || params.quality > 100 {
            return Err(CodecError::InvalidArgument(format!(
                "JPEG quality {} outside 1..=100",
                params.quality
            )));
        }
        let width = u16::try_from(image.width)
            .map_err(|_| CodecError::Encode(format!("width {} exceeds 65535", image.width)))?;
        let height = u16::try_from(image.height)
            .map_err(|_| CodecError::Encode(format!("height {} exceeds 65535", image.height)))?;

        let mut out = Vec::new();
        let mut encoder = jpeg_encoder::Encoder::new(&mut out, params.quality);
        encoder.set_sampling_factor(sampling_factor(params.subsampling));
        encoder.set_progressive(params.progressive);
        encoder.set_optimized_huffman_tables(params.optimize);

        let row_bytes = image.width as usize * 3;
        if image.stride == row_bytes {
            encoder.encode(image.pixels(), width, height, jpeg_encoder::ColorType::Rgb)?;
        } else {
            let mut tight = Vec::with_capacity(row_bytes * image.height as usize);
            for y in 0..image.height {
                tight.extend_from_slice(image.row(y));
            }
            encoder.encode(&tight, width, height, jpeg_encoder::ColorType::Rgb)?;
        }

        Ok(out)
    }
}

fn sampling_factor(subsampling: Subsampling) -> SamplingFactor {
    match subsampling {
        Subsampling::S444 => SamplingFactor::F_1_1,
        Subsampling::S422 => SamplingFactor::F_2_1,
        Subsampling::S420 => SamplingFactor::F_2_2,
        Subsampling::S411 => SamplingFactor::F_4_1,
    }
}

/// Normalize decoder output to tightly packed RGB.
fn to_rgb(raw: Vec<u8>, format: jpeg::PixelFormat) -> Result<Vec<u8>, CodecError> {
    match format {
        jpeg::PixelFormat::RGB24 => Ok(raw),
        jpeg::PixelFormat::L8 => {
            let mut rgb = Vec::with_capacity(raw.len() * 3);
            for luma in raw {
                rgb.extend_from_slice(&[luma, luma, luma]);
            }
            Ok(rgb)
        }
        jpeg::PixelFormat::L16 => {
            let mut rgb = Vec::with_capacity(raw.len() / 2 * 3);
            for pair in raw.chunks_exact(2) {
                // big-endian; keep the high byte
                let luma = pair[0];
                rgb.extend_from_slice(&[luma, luma, luma]);
            }
            Ok(rgb)
        }
        jpeg::PixelFormat::CMYK32 => {
            let mut rgb = Vec::with_capacity(raw.len() / 4 * 3);
            for px in raw.chunks_exact(4) {
                let (c, m, y, k) = (
                    u16::from(px[0]),
                    u16::from(px[1]),
                    u16::from(px[2]),
                    u16::from(px[3]),
                );
                rgb.push((c * k / 255) as u8);
                rgb.push((m * k / 255) as u8);
                rgb.push((y * k / 255) as u8);
            }
            Ok(rgb)
        }
    }
}
