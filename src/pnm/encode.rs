//! Netpbm encoder: P3/P6 for RGB, P2/P5 for grayscale.

use std::fmt::Write as _;

use crate::error::CodecError;
use crate::image::{FormatParams, Image, PnmParams};

use super::PnmFamily;

/// Scale a stored 0..255 sample to the target `max_val` range.
fn scale_out(stored: u8, max_val: u32) -> u32 {
    u32::from(stored) * max_val / 255
}

pub(super) fn encode_pnm(image: &Image, family: PnmFamily) -> Result<Vec<u8>, CodecError> {
    if image.color_type != family.color_type() || image.bit_depth != 8 {
        return Err(CodecError::UnsupportedFormat(format!(
            "{} encode needs 8-bit {:?}, got {:?} at {} bits",
            family.format().name(),
            family.color_type(),
            image.color_type,
            image.bit_depth
        )));
    }

    let params = match &image.params {
        FormatParams::Pnm(params) => *params,
        _ => PnmParams::default(),
    };
    if params.max_val == 0 {
        return Err(CodecError::UnsupportedFormat("max_val 0".into()));
    }
    if !params.ascii && params.max_val > 255 {
        return Err(CodecError::UnsupportedFormat(
            "binary encode is 8-bit; use the ASCII variant for max_val > 255".into(),
        ));
    }
    let max_val = u32::from(params.max_val);

    let magic = match (family, params.ascii) {
        (PnmFamily::Ppm, true) => "P3",
        (PnmFamily::Ppm, false) => "P6",
        (PnmFamily::Pgm, true) => "P2",
        (PnmFamily::Pgm, false) => "P5",
    };
    let header = format!("{magic}\n{} {}\n{max_val}\n", image.width, image.height);

    let w = image.width as usize;
    let channels = family.channels();
    let row_samples = w * channels;

    let mut out = Vec::with_capacity(header.len() + image.height as usize * row_samples);
    out.extend_from_slice(header.as_bytes());

    if params.ascii {
        let mut line = String::new();
        for y in 0..image.height {
            line.clear();
            for (i, &sample) in image.row(y).iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                let _ = write!(line, "{}", scale_out(sample, max_val));
            }
            line.push('\n');
            out.extend_from_slice(line.as_bytes());
        }
    } else if max_val == 255 {
        for y in 0..image.height {
            out.extend_from_slice(image.row(y));
        }
    } else {
        for y in 0..image.height {
            for &sample in image.row(y) {
                out.push(scale_out(sample, max_val) as u8);
            }
        }
    }

    Ok(out)
}
