//! XBM codec. An XBM file is C source: width/height `#define`s plus an
//! `unsigned char <name>_bits[]` initializer, one bit per pixel,
//! LSB-first within each byte, rows padded to a byte boundary.
//!
//! Loaded images are grayscale with the bits expanded to one byte per
//! pixel (set bit = foreground = 255) and `bit_depth = 1` kept as
//! metadata.

use std::path::Path;

use crate::codec::ImageCodec;
use crate::error::CodecError;
use crate::image::{ColorType, FormatParams, Image, ImageFormat, ImageInfo};
use crate::limits::Limits;
use crate::scan::Scanner;

pub struct XbmCodec;

impl ImageCodec for XbmCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Xbm
    }

    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError> {
        let text = std::str::from_utf8(data)
            .map_err(|_| CodecError::Decode("XBM source is not valid UTF-8".into()))?;
        let (width, _) = find_define(text, "_width")?;
        let (height, _) = find_define(text, "_height")?;
        Ok(ImageInfo {
            width,
            height,
            format: ImageFormat::Xbm,
            color_type: ColorType::Gray,
        })
    }

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
        decode_xbm(data, limits)
    }

    fn encode(&self, image: &Image, path: &Path) -> Result<Vec<u8>, CodecError> {
        encode_xbm(image, &identifier_from_path(path))
    }
}

/// Derive a C identifier from the destination file's basename:
/// extension stripped, non-identifier characters replaced with `_`,
/// a leading digit prefixed with `_`.
pub(crate) fn identifier_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("image");
    } else if name.as_bytes()[0].is_ascii_digit() {
        name.insert(0, '_');
    }
    name
}

/// Find the integer following a `#define` whose macro name ends in
/// `suffix` (`_width`, `_height`). Returns the value and the macro
/// name's prefix.
fn find_define<'a>(text: &'a str, suffix: &str) -> Result<(u32, &'a str), CodecError> {
    let mut rest = text;
    while let Some(at) = rest.find("#define") {
        rest = &rest[at + "#define".len()..];
        let trimmed = rest.trim_start();
        let name_len = trimmed
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(trimmed.len());
        let name = &trimmed[..name_len];
        if let Some(prefix) = name.strip_suffix(suffix) {
            let mut scan = Scanner::new(trimmed[name_len..].as_bytes());
            return Ok((scan.next_int()?, prefix));
        }
    }
    Err(CodecError::Decode(format!("missing *{suffix} #define")))
}

fn decode_xbm(data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
    let text = std::str::from_utf8(data)
        .map_err(|_| CodecError::Decode("XBM source is not valid UTF-8".into()))?;

    let (width, name) = find_define(text, "_width")?;
    let (height, _) = find_define(text, "_height")?;
    if width == 0 || height == 0 {
        return Err(CodecError::Decode(format!(
            "zero dimension: {width}x{height}"
        )));
    }
    if let Some(limits) = limits {
        limits.admit(width, height, width as usize * height as usize)?;
    }

    let body = text
        .find('{')
        .map(|at| &text[at + 1..])
        .ok_or_else(|| CodecError::Decode("missing bits initializer".into()))?;

    let w = width as usize;
    let h = height as usize;
    let row_bytes = w.div_ceil(8);
    let expected = row_bytes * h;

    let mut scan = Scanner::new(body.as_bytes());
    let mut bits = Vec::with_capacity(expected);
    for _ in 0..expected {
        let value = scan.next_int()?;
        if value > 0xFF {
            return Err(CodecError::Decode(format!(
                "byte value {value:#x} out of range"
            )));
        }
        bits.push(value as u8);
        // trailing comma after the final element is legal C
        scan.accept(b',');
    }
    scan.expect(b'}')?;

    // expand to one byte per pixel, LSB-first, set bit = foreground
    let mut pixels = vec![0u8; w * h];
    for y in 0..h {
        let row = &bits[y * row_bytes..(y + 1) * row_bytes];
        let out = &mut pixels[y * w..(y + 1) * w];
        for (x, px) in out.iter_mut().enumerate() {
            if (row[x / 8] >> (x % 8)) & 1 == 1 {
                *px = 0xFF;
            }
        }
    }

    let mut image = Image::from_buffer(
        width,
        height,
        w,
        ColorType::Gray,
        1,
        ImageFormat::Xbm,
        pixels,
    );
    image.params = FormatParams::Xbm { name: name.into() };
    Ok(image)
}

fn encode_xbm(image: &Image, name: &str) -> Result<Vec<u8>, CodecError> {
    if image.color_type != ColorType::Gray {
        return Err(CodecError::UnsupportedFormat(format!(
            "XBM encode needs Gray, got {:?}",
            image.color_type
        )));
    }

    let w = image.width as usize;
    let row_bytes = w.div_ceil(8);
    let mut bits = Vec::with_capacity(row_bytes * image.height as usize);
    for y in 0..image.height {
        let row = image.row(y);
        for chunk in row.chunks(8) {
            let mut byte = 0u8;
            for (i, &px) in chunk.iter().enumerate() {
                if px != 0 {
                    byte |= 1 << i;
                }
            }
            bits.push(byte);
        }
    }

    let mut out = String::new();
    out.push_str(&format!("#define {name}_width {}\n", image.width));
    out.push_str(&format!("#define {name}_height {}\n", image.height));
    out.push_str(&format!("static unsigned char {name}_bits[] = {{\n"));
    for (i, byte) in bits.iter().enumerate() {
        if i % 12 == 0 {
            out.push_str("   ");
        }
        out.push_str(&format!("{byte:#04x}"));
        if i + 1 < bits.len() {
            out.push(',');
            if i % 12 == 11 {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
    }
    out.push_str("};\n");

    Ok(out.into_bytes())
}
