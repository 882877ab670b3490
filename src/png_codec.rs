//! PNG codec, backed by the `png` crate.
//!
//! The library owns the DEFLATE/filter pipeline; this module maps its
//! color model onto [`Image`]. Sub-byte depths are expanded to one byte
//! per sample and palettes are resolved to RGB on decode
//! (`Transformations::EXPAND`); the source bit depth is kept as
//! metadata.

use std::io::Cursor;
use std::path::Path;

use crate::codec::ImageCodec;
use crate::error::CodecError;
use crate::image::{ColorType, FormatParams, Image, ImageFormat, ImageInfo, Interlace, PngParams};
use crate::limits::Limits;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError> {
        if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
            return Err(CodecError::Decode("missing PNG signature".into()));
        }
        let mut decoder = png::Decoder::new(Cursor::new(data));
        let info = decoder.read_header_info()?;
        let alpha = info.trns.is_some();
        let color_type = match info.color_type {
            png::ColorType::Grayscale if alpha => ColorType::GrayAlpha,
            png::ColorType::Grayscale => ColorType::Gray,
            png::ColorType::GrayscaleAlpha => ColorType::GrayAlpha,
            png::ColorType::Rgb if alpha => ColorType::Rgba,
            png::ColorType::Rgb => ColorType::Rgb,
            png::ColorType::Rgba => ColorType::Rgba,
            // palettes expand to RGB on decode
            png::ColorType::Indexed if alpha => ColorType::Rgba,
            png::ColorType::Indexed => ColorType::Rgb,
        };
        Ok(ImageInfo {
            width: info.width,
            height: info.height,
            format: ImageFormat::Png,
            color_type,
        })
    }

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
        if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
            return Err(CodecError::Decode("missing PNG signature".into()));
        }

        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info()?;

        let (width, height) = {
            let info = reader.info();
            (info.width, info.height)
        };
        if let Some(limits) = limits {
            limits.admit(width, height, reader.output_buffer_size())?;
        }
        let source_depth = reader.info().bit_depth as u8;
        let interlace = if reader.info().interlaced {
            Interlace::Adam7
        } else {
            Interlace::None
        };

        let mut pixels = vec![0u8; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut pixels)?;
        pixels.truncate(frame.buffer_size());

        let color_type = match frame.color_type {
            png::ColorType::Grayscale => ColorType::Gray,
            png::ColorType::GrayscaleAlpha => ColorType::GrayAlpha,
            png::ColorType::Rgb => ColorType::Rgb,
            png::ColorType::Rgba => ColorType::Rgba,
            png::ColorType::Indexed => ColorType::Indexed,
        };

        let mut image = Image::from_buffer(
            frame.width,
            frame.height,
            frame.line_size,
            color_type,
            source_depth,
            ImageFormat::Png,
            pixels,
        );
        image.params = FormatParams::Png(PngParams { interlace });
        Ok(image)
    }

    fn encode(&self, image: &Image, _path: &Path) -> Result<Vec<u8>, CodecError> {
        let color = match image.color_type {
            ColorType::Rgb => png::ColorType::Rgb,
            ColorType::Rgba => png::ColorType::Rgba,
            ColorType::Gray => png::ColorType::Grayscale,
            ColorType::GrayAlpha => png::ColorType::GrayscaleAlpha,
            other => {
                return Err(CodecError::UnsupportedFormat(format!(
                    "PNG encode does not support {other:?}"
                )));
            }
        };
        if image.bit_depth != 8 {
            return Err(CodecError::UnsupportedFormat(format!(
                "PNG encode is 8-bit only, got {} bits",
                image.bit_depth
            )));
        }

        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, image.width, image.height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;

        let row_bytes = image.width as usize * image.channels();
        if image.stride == row_bytes {
            writer.write_image_data(image.pixels())?;
        } else {
            // drop the stride padding before handing rows to the library
            let mut tight = Vec::with_capacity(row_bytes * image.height as usize);
            for y in 0..image.height {
                tight.extend_from_slice(image.row(y));
            }
            writer.write_image_data(&tight)?;
        }
        writer.finish()?;

        Ok(out)
    }
}
