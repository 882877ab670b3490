//! Netpbm decoder: ASCII (P2/P3) and binary (P5/P6) variants.

use crate::error::CodecError;
use crate::image::{FormatParams, Image, ImageInfo, PnmParams};
use crate::limits::Limits;
use crate::scan::Scanner;

use super::PnmFamily;

struct PnmHeader {
    ascii: bool,
    width: u32,
    height: u32,
    max_val: u32,
    /// Byte offset of the first sample (binary variants only).
    data_offset: usize,
}

fn parse_header(data: &[u8], family: PnmFamily) -> Result<(PnmHeader, Scanner<'_>), CodecError> {
    let magic = data.get(..2).ok_or(CodecError::UnexpectedEof)?;
    if magic[0] != b'P' {
        return Err(CodecError::Decode("missing Netpbm magic".into()));
    }
    let ascii = match (magic[1], family) {
        (b'3', PnmFamily::Ppm) | (b'2', PnmFamily::Pgm) => true,
        (b'6', PnmFamily::Ppm) | (b'5', PnmFamily::Pgm) => false,
        (other, _) => {
            return Err(CodecError::Decode(format!(
                "magic P{} does not belong to this codec",
                char::from(other)
            )));
        }
    };

    let mut scan = Scanner::new(data);
    scan.bump();
    scan.bump();

    let width = scan.next_u32()?;
    let height = scan.next_u32()?;
    let max_val = scan.next_u32()?;
    if width == 0 || height == 0 {
        return Err(CodecError::Decode(format!(
            "zero dimension: {width}x{height}"
        )));
    }
    if max_val == 0 || max_val > 65535 {
        return Err(CodecError::Decode(format!("max_val {max_val} out of range")));
    }

    // Binary variants: exactly one whitespace byte separates the header
    // from the raw samples.
    let data_offset = if ascii {
        scan.pos()
    } else {
        match scan.peek() {
            Some(b) if b.is_ascii_whitespace() => scan.pos() + 1,
            Some(_) => {
                return Err(CodecError::Decode(
                    "missing whitespace after binary header".into(),
                ));
            }
            None => return Err(CodecError::UnexpectedEof),
        }
    };

    Ok((
        PnmHeader {
            ascii,
            width,
            height,
            max_val,
            data_offset,
        },
        scan,
    ))
}

/// Header-only probe.
pub(super) fn probe_pnm(data: &[u8], family: PnmFamily) -> Result<ImageInfo, CodecError> {
    let (header, _) = parse_header(data, family)?;
    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        format: family.format(),
        color_type: family.color_type(),
    })
}

/// Rescale a sample from `0..=max_val` to `0..=255` (integer math).
fn rescale(sample: u32, max_val: u32) -> u8 {
    (sample * 255 / max_val) as u8
}

pub(super) fn decode_pnm(
    data: &[u8],
    family: PnmFamily,
    limits: Option<&Limits>,
) -> Result<Image, CodecError> {
    let (header, mut scan) = parse_header(data, family)?;

    let w = header.width as usize;
    let h = header.height as usize;
    let channels = family.channels();
    let samples = w
        .checked_mul(h)
        .and_then(|wh| wh.checked_mul(channels))
        .ok_or(CodecError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    if let Some(limits) = limits {
        limits.admit(header.width, header.height, samples)?;
    }

    let mut pixels = Vec::with_capacity(samples);
    if header.ascii {
        for _ in 0..samples {
            let sample = scan.next_u32()?;
            if sample > header.max_val {
                return Err(CodecError::Decode(format!(
                    "sample {sample} exceeds max_val {}",
                    header.max_val
                )));
            }
            pixels.push(rescale(sample, header.max_val));
        }
    } else {
        let raw = data
            .get(header.data_offset..)
            .ok_or(CodecError::UnexpectedEof)?;
        if header.max_val <= 255 {
            if raw.len() < samples {
                return Err(CodecError::UnexpectedEof);
            }
            for &byte in &raw[..samples] {
                let sample = u32::from(byte);
                if sample > header.max_val {
                    return Err(CodecError::Decode(format!(
                        "sample {sample} exceeds max_val {}",
                        header.max_val
                    )));
                }
                pixels.push(rescale(sample, header.max_val));
            }
        } else {
            // two bytes per sample, big-endian
            if raw.len() < samples * 2 {
                return Err(CodecError::UnexpectedEof);
            }
            for pair in raw[..samples * 2].chunks_exact(2) {
                let sample = u32::from(u16::from_be_bytes([pair[0], pair[1]]));
                if sample > header.max_val {
                    return Err(CodecError::Decode(format!(
                        "sample {sample} exceeds max_val {}",
                        header.max_val
                    )));
                }
                pixels.push(rescale(sample, header.max_val));
            }
        }
    }

    let mut image = Image::from_buffer(
        header.width,
        header.height,
        w * channels,
        family.color_type(),
        8,
        family.format(),
        pixels,
    );
    image.params = FormatParams::Pnm(PnmParams {
        ascii: header.ascii,
        max_val: header.max_val as u16,
    });
    Ok(image)
}
