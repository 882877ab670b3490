//! XPM codec. An XPM file is C source declaring a string array:
//! a header string `"width height ncolors chars_per_pixel"`, `ncolors`
//! palette entries of the form `"<chars> c <color>"`, then `height`
//! pixel rows of `width * chars_per_pixel` characters.
//!
//! Recognized color tokens are `None` (transparent) and `#RRGGBB`.
//! Images with a `None` entry load as Rgba, all others as Rgb.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::codec::ImageCodec;
use crate::error::CodecError;
use crate::image::{ColorType, FormatParams, Image, ImageFormat, ImageInfo};
use crate::limits::Limits;
use crate::scan::Scanner;
use crate::xbm::identifier_from_path;

/// Palette alphabet used on encode, in libXpm printing order. 92
/// printable ASCII characters; `"` and `\` are excluded.
const ALPHABET: &[u8] =
    b" .XoO+@#$%&*=-;:>,<1234567890qwertyuipasdfghjklzxcvbnmMNBVCZASDFGHJKLPIUYTREWQ!~^/()_`'][{}|";

pub struct XpmCodec;

impl ImageCodec for XpmCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Xpm
    }

    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError> {
        let text = std::str::from_utf8(data)
            .map_err(|_| CodecError::Decode("XPM source is not valid UTF-8".into()))?;
        let literals = string_literals(text)?;
        let mut strings = literals.iter();
        let header = strings
            .next()
            .ok_or_else(|| CodecError::Decode("missing XPM header string".into()))?;
        let mut scan = Scanner::new(header.as_bytes());
        let width = scan.next_u32()?;
        let height = scan.next_u32()?;
        let ncolors = scan.next_u32()?;
        let transparent = strings
            .take(ncolors as usize)
            .any(|entry| entry.split_ascii_whitespace().any(|tok| tok == "None"));
        Ok(ImageInfo {
            width,
            height,
            format: ImageFormat::Xpm,
            color_type: if transparent {
                ColorType::Rgba
            } else {
                ColorType::Rgb
            },
        })
    }

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
        decode_xpm(data, limits)
    }

    fn encode(&self, image: &Image, path: &Path) -> Result<Vec<u8>, CodecError> {
        encode_xpm(image, &identifier_from_path(path))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum PaletteColor {
    Rgb([u8; 3]),
    Transparent,
}

/// Collect the C string literals of the array initializer, in order.
/// C and C++ comments between strings are skipped.
fn string_literals(text: &str) -> Result<Vec<&str>, CodecError> {
    let bytes = text.as_bytes();
    let mut literals = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != b'"' {
                    end += 1;
                }
                if end == bytes.len() {
                    return Err(CodecError::Decode("unterminated string literal".into()));
                }
                literals.push(&text[start..end]);
                i = end + 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = text[i + 2..]
                    .find("*/")
                    .ok_or_else(|| CodecError::Decode("unterminated comment".into()))?;
                i += 2 + close + 2;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    Ok(literals)
}

/// The identifier of `static char *<name>[]`, if the declaration is
/// well-formed.
fn array_identifier(text: &str) -> Option<String> {
    let bracket = text.find("[]")?;
    let name: String = text[..bracket]
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name.chars().rev().collect())
    }
}

fn parse_color_token(token: &str) -> Result<PaletteColor, CodecError> {
    if token == "None" {
        return Ok(PaletteColor::Transparent);
    }
    let hex = token
        .strip_prefix('#')
        .ok_or_else(|| CodecError::Decode(format!("unsupported color token {token:?}")))?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::Decode(format!("malformed color {token:?}")));
    }
    let value = u32::from_str_radix(hex, 16).expect("validated hex digits");
    Ok(PaletteColor::Rgb([
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    ]))
}

fn decode_xpm(data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
    let text = std::str::from_utf8(data)
        .map_err(|_| CodecError::Decode("XPM source is not valid UTF-8".into()))?;

    let literals = string_literals(text)?;
    let mut strings = literals.iter();
    let header = strings
        .next()
        .ok_or_else(|| CodecError::Decode("missing XPM header string".into()))?;

    let mut scan = Scanner::new(header.as_bytes());
    let width = scan.next_u32()?;
    let height = scan.next_u32()?;
    let ncolors = scan.next_u32()?;
    let cpp = scan.next_u32()? as usize;
    if width == 0 || height == 0 || ncolors == 0 || cpp == 0 {
        return Err(CodecError::Decode(format!(
            "bad XPM header \"{width} {height} {ncolors} {cpp}\""
        )));
    }
    if let Some(limits) = limits {
        limits.admit(width, height, width as usize * height as usize * 4)?;
    }

    let mut palette: HashMap<&str, PaletteColor> = HashMap::with_capacity(ncolors as usize);
    let mut transparent = false;
    for _ in 0..ncolors {
        let entry = strings
            .next()
            .ok_or_else(|| CodecError::Decode("missing color entry".into()))?;
        if !entry.is_ascii() {
            return Err(CodecError::Decode(format!("non-ASCII color entry {entry:?}")));
        }
        if entry.len() < cpp {
            return Err(CodecError::Decode(format!("short color entry {entry:?}")));
        }
        let (key, spec) = entry.split_at(cpp);
        let mut tokens = spec.split_ascii_whitespace();
        let color = loop {
            match tokens.next() {
                Some("c") => {
                    let token = tokens.next().ok_or_else(|| {
                        CodecError::Decode(format!("color entry {entry:?} has no value"))
                    })?;
                    break parse_color_token(token)?;
                }
                // other key types (symbolic, mono, grayscale) are skipped
                Some(_) => continue,
                None => {
                    return Err(CodecError::Decode(format!(
                        "color entry {entry:?} lacks a 'c' key"
                    )));
                }
            }
        };
        if color == PaletteColor::Transparent {
            transparent = true;
        }
        palette.insert(key, color);
    }

    let color_type = if transparent {
        ColorType::Rgba
    } else {
        ColorType::Rgb
    };
    let channels = color_type.channels();
    let w = width as usize;
    let h = height as usize;
    let stride = w * channels;
    let mut pixels = vec![0u8; stride * h];

    for y in 0..h {
        let row = strings
            .next()
            .ok_or_else(|| CodecError::Decode(format!("missing pixel row {y}")))?;
        if !row.is_ascii() {
            return Err(CodecError::Decode(format!("non-ASCII pixel row {y}")));
        }
        if row.len() != w * cpp {
            return Err(CodecError::Decode(format!(
                "pixel row {y} is {} chars, expected {}",
                row.len(),
                w * cpp
            )));
        }
        let out = &mut pixels[y * stride..(y + 1) * stride];
        for x in 0..w {
            let key = &row[x * cpp..(x + 1) * cpp];
            let color = palette.get(key).ok_or_else(|| {
                CodecError::Decode(format!("pixel {key:?} not in the palette"))
            })?;
            let px = &mut out[x * channels..(x + 1) * channels];
            match color {
                PaletteColor::Rgb(rgb) => {
                    px[..3].copy_from_slice(rgb);
                    if transparent {
                        px[3] = 0xFF;
                    }
                }
                PaletteColor::Transparent => {
                    px.fill(0);
                }
            }
        }
    }

    let name = array_identifier(text).unwrap_or_else(|| String::from("image"));
    let mut image = Image::from_buffer(
        width,
        height,
        stride,
        color_type,
        8,
        ImageFormat::Xpm,
        pixels,
    );
    image.params = FormatParams::Xpm { name };
    Ok(image)
}

/// Shortest key length covering `ncolors` over the alphabet.
fn chars_per_pixel(ncolors: usize) -> usize {
    let mut cpp = 1;
    let mut reach = ALPHABET.len();
    while reach < ncolors {
        cpp += 1;
        reach *= ALPHABET.len();
    }
    cpp
}

fn key_for(mut index: usize, cpp: usize) -> String {
    let mut key = vec![b' '; cpp];
    for slot in key.iter_mut().rev() {
        *slot = ALPHABET[index % ALPHABET.len()];
        index /= ALPHABET.len();
    }
    String::from_utf8(key).expect("alphabet is ASCII")
}

fn encode_xpm(image: &Image, name: &str) -> Result<Vec<u8>, CodecError> {
    let channels = match image.color_type {
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        other => {
            return Err(CodecError::UnsupportedFormat(format!(
                "XPM encode needs Rgb or Rgba, got {other:?}"
            )));
        }
    };
    if image.bit_depth != 8 {
        return Err(CodecError::UnsupportedFormat(format!(
            "XPM encode is 8-bit only, got {} bits",
            image.bit_depth
        )));
    }

    // first pass: the palette, in first-seen order
    let mut index: HashMap<PaletteColor, usize> = HashMap::new();
    let mut colors: Vec<PaletteColor> = Vec::new();
    for y in 0..image.height {
        for px in image.row(y).chunks_exact(channels) {
            let color = if channels == 4 && px[3] == 0 {
                PaletteColor::Transparent
            } else {
                PaletteColor::Rgb([px[0], px[1], px[2]])
            };
            index.entry(color).or_insert_with(|| {
                colors.push(color);
                colors.len() - 1
            });
        }
    }

    let cpp = chars_per_pixel(colors.len());
    let mut out = String::new();
    out.push_str("/* XPM */\n");
    let _ = writeln!(out, "static char *{name}[] = {{");
    let _ = writeln!(
        out,
        "\"{} {} {} {cpp}\",",
        image.width,
        image.height,
        colors.len()
    );
    for (i, color) in colors.iter().enumerate() {
        let key = key_for(i, cpp);
        match color {
            PaletteColor::Rgb([r, g, b]) => {
                let _ = writeln!(out, "\"{key} c #{r:02X}{g:02X}{b:02X}\",");
            }
            PaletteColor::Transparent => {
                let _ = writeln!(out, "\"{key} c None\",");
            }
        }
    }
    for y in 0..image.height {
        out.push('"');
        for px in image.row(y).chunks_exact(channels) {
            let color = if channels == 4 && px[3] == 0 {
                PaletteColor::Transparent
            } else {
                PaletteColor::Rgb([px[0], px[1], px[2]])
            };
            out.push_str(&key_for(index[&color], cpp));
        }
        out.push('"');
        if y + 1 < image.height {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("};\n");

    Ok(out.into_bytes())
}
