//! Netpbm codecs: PPM (P3/P6) and PGM (P2/P5).
//!
//! ASCII and binary variants share one header grammar; `#` comments may
//! appear anywhere between header tokens. Samples are rescaled to the
//! 0..255 range in memory when `max_val != 255` and scaled back
//! symmetrically on save.

mod decode;
mod encode;

use std::path::Path;

use crate::codec::ImageCodec;
use crate::error::CodecError;
use crate::image::{ColorType, Image, ImageFormat, ImageInfo};
use crate::limits::Limits;

/// Which half of the Netpbm family a codec entry owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PnmFamily {
    /// P3 (ASCII) / P6 (binary), RGB.
    Ppm,
    /// P2 (ASCII) / P5 (binary), grayscale.
    Pgm,
}

impl PnmFamily {
    fn format(self) -> ImageFormat {
        match self {
            Self::Ppm => ImageFormat::Ppm,
            Self::Pgm => ImageFormat::Pgm,
        }
    }

    fn color_type(self) -> ColorType {
        match self {
            Self::Ppm => ColorType::Rgb,
            Self::Pgm => ColorType::Gray,
        }
    }

    fn channels(self) -> usize {
        self.color_type().channels()
    }
}

pub struct PpmCodec;

impl ImageCodec for PpmCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Ppm
    }

    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError> {
        decode::probe_pnm(data, PnmFamily::Ppm)
    }

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
        decode::decode_pnm(data, PnmFamily::Ppm, limits)
    }

    fn encode(&self, image: &Image, _path: &Path) -> Result<Vec<u8>, CodecError> {
        encode::encode_pnm(image, PnmFamily::Ppm)
    }
}

pub struct PgmCodec;

impl ImageCodec for PgmCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Pgm
    }

    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError> {
        decode::probe_pnm(data, PnmFamily::Pgm)
    }

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
        decode::decode_pnm(data, PnmFamily::Pgm, limits)
    }

    fn encode(&self, image: &Image, _path: &Path) -> Result<Vec<u8>, CodecError> {
        encode::encode_pnm(image, PnmFamily::Pgm)
    }
}
