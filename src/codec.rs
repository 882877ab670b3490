//! Codec dispatch: one trait per capability set, one static registry.
//!
//! Every format implements [`ImageCodec`] on a zero-sized singleton; the
//! registry is a plain static slice, read-only for the life of the
//! process. The facade only ever talks to codecs through the trait.

use std::path::Path;

use crate::error::CodecError;
use crate::image::{Image, ImageFormat, ImageInfo};
use crate::limits::Limits;

/// A registered image codec.
///
/// `decode` consumes the whole file contents and returns a fully loaded
/// [`Image`]; `encode` serializes one. Both are memory-to-memory — file
/// handles are owned by the facade. `encode` receives the destination
/// path because the XBM/XPM source formats derive their C identifier
/// from the file's basename; byte-oriented codecs ignore it.
pub trait ImageCodec: Sync {
    fn format(&self) -> ImageFormat;

    /// Parse the header only: dimensions and the color type a full
    /// decode would produce.
    fn probe(&self, data: &[u8]) -> Result<ImageInfo, CodecError>;

    fn decode(&self, data: &[u8], limits: Option<&Limits>) -> Result<Image, CodecError>;

    fn encode(&self, image: &Image, path: &Path) -> Result<Vec<u8>, CodecError>;
}

static CODECS: &[&dyn ImageCodec] = &[
    &crate::png_codec::PngCodec,
    &crate::jpeg_codec::JpegCodec,
    &crate::bmp::BmpCodec,
    &crate::pnm::PpmCodec,
    &crate::pnm::PgmCodec,
    &crate::xbm::XbmCodec,
    &crate::xpm::XpmCodec,
];

/// Look up the codec registered for a format tag.
pub(crate) fn by_format(format: ImageFormat) -> Option<&'static dyn ImageCodec> {
    CODECS.iter().copied().find(|c| c.format() == format)
}
