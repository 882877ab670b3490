//! BMP image format decoder and encoder.
//!
//! Implemented byte-exact, without an external library. The supported
//! profile is uncompressed 24-bit RGB (`BI_RGB`); RLE4/RLE8/BITFIELDS
//! and other bit depths are recognized in the header and rejected.

mod decode;
mod encode;

use std::path::Path;

use crate::codec::ImageCodec;
use crate::error::CodecError;
use crate::image::{Image, ImageFormat, ImageInfo};
use crate::limits::Limits;

/// Offset of the pixel array when no palette is present: 14-byte file
/// header plus 40-byte BITMAPINFOHEADER.
const PIXEL_DATA_OFFSET: u32 = 54;

/// Bytes per row on disk, padded to a multiple of four.
fn row_bytes(width: u32, bpp: u16) -> usize {
    ((width as usize * bpp as usize + 7) / 8 + 3) & !3
}

/// Pixels per meter written into the info header (~72 DPI). Ignored on
/// load.
const PPM_72DPI: i32 = 2835;

pub struct BmpCodec;

impl ImageCodec for BmpCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }

    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError> {
        decode::probe_bmp(data)
    }

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError> {
        decode::decode_bmp(data, limits)
    }

    fn encode(&self, image: &Image, _path: &Path) -> Result<Vec<u8>, CodecError> {
        encode::encode_bmp(image)
    }
}
