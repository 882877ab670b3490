//! # waybitmaps
//!
//! Image codecs and a damage-region algebra for Wayland client
//! toolkits.
//!
//! ## Image I/O
//!
//! [`load_image`] picks a codec from the filename extension
//! (case-insensitive); [`save_image`] dispatches on the image's
//! [`format`](Image::format) tag. Per-format state (JPEG quality, BMP
//! orientation, Netpbm variant, ...) travels with the image in
//! [`FormatParams`].
//!
//! | Format | Decode | Encode |
//! |--------|--------|--------|
//! | PNG    | all color types, depths 1–16 (via the `png` crate) | 8-bit Gray/GrayAlpha/Rgb/Rgba |
//! | JPEG   | always lands on 8-bit RGB | 8-bit RGB, quality/subsampling/progressive |
//! | BMP    | uncompressed 24-bpp, bottom-up or top-down | same profile, bit-exact layout |
//! | PPM/PGM| P3/P2 ASCII and P6/P5 binary, `max_val` up to 65535 | 8-bit, both variants |
//! | XBM/XPM| C source formats | same |
//!
//! ```no_run
//! use waybitmaps::{load_image, save_image, ImageFormat};
//!
//! let mut image = load_image("wallpaper.png")?;
//! image.set_format(ImageFormat::Jpeg);
//! save_image(&image, "wallpaper.jpg")?;
//! # Ok::<(), waybitmaps::CodecError>(())
//! ```
//!
//! ## Regions
//!
//! [`Region`] keeps a list of fractional rectangles with cached
//! bounding extents for damage accumulation, with point membership,
//! clipping, intersection, union, and a text round-trip.

#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

mod bmp;
mod codec;
mod error;
mod image;
mod jpeg_codec;
mod limits;
mod pnm;
mod png_codec;
mod region;
mod scan;
mod xbm;
mod xpm;

pub use codec::ImageCodec;
pub use error::CodecError;
pub use image::{
    BmpCompression, BmpParams, ColorType, FormatParams, Image, ImageFormat, ImageInfo, Interlace,
    JpegParams, PngParams, PnmParams, Subsampling,
};
pub use limits::Limits;
pub use region::{Rect, Region};

/// Load an image, choosing the codec from the filename extension.
///
/// Empty paths and paths without an extension fail with
/// [`CodecError::InvalidArgument`]; unrecognized extensions fail with
/// [`CodecError::UnsupportedFormat`]. Neither touches the filesystem.
pub fn load_image(path: impl AsRef<Path>) -> Result<Image, CodecError> {
    load_with(path.as_ref(), None)
}

/// Load an image, rejecting files whose decoded size exceeds `limits`.
pub fn load_image_with_limits(
    path: impl AsRef<Path>,
    limits: &Limits,
) -> Result<Image, CodecError> {
    load_with(path.as_ref(), Some(limits))
}

fn load_with(path: &Path, limits: Option<&Limits>) -> Result<Image, CodecError> {
    let result = (|| {
        let codec = codec_for_path(path)?;
        let data = fs::read(path).map_err(|err| CodecError::io(path, err))?;
        codec.decode(&data, limits)
    })();
    if let Err(err) = &result {
        log::warn!("failed to load {}: {err}", path.display());
    }
    result
}

/// Read an image file's header without decoding the pixel data.
///
/// Path and extension handling match [`load_image`].
pub fn probe_image(path: impl AsRef<Path>) -> Result<ImageInfo, CodecError> {
    let path = path.as_ref();
    let codec = codec_for_path(path)?;
    let data = fs::read(path).map_err(|err| CodecError::io(path, err))?;
    codec.probe(&data)
}

/// Save an image, dispatching on its [`format`](Image::format) tag.
///
/// The extension of `path` is not consulted — retag with
/// [`Image::set_format`] to convert between formats.
pub fn save_image(image: &Image, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let path = path.as_ref();
    let result = (|| {
        if path.as_os_str().is_empty() {
            return Err(CodecError::InvalidArgument("empty path".into()));
        }
        if image.width == 0 || image.height == 0 || image.channels() == 0 {
            return Err(CodecError::InvalidArgument(format!(
                "image is not loaded: {}x{} {:?}",
                image.width, image.height, image.color_type
            )));
        }
        let codec = codec::by_format(image.format).ok_or_else(|| {
            CodecError::UnsupportedFormat(format!("no codec for {}", image.format.name()))
        })?;
        let bytes = codec.encode(image, path)?;
        fs::write(path, bytes).map_err(|err| CodecError::io(path, err))
    })();
    if let Err(err) = &result {
        log::warn!("failed to save {}: {err}", path.display());
    }
    result
}

fn codec_for_path(path: &Path) -> Result<&'static dyn ImageCodec, CodecError> {
    if path.as_os_str().is_empty() {
        return Err(CodecError::InvalidArgument("empty path".into()));
    }
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            CodecError::InvalidArgument(format!("no file extension on {}", path.display()))
        })?;
    let format = ImageFormat::from_extension(ext);
    codec::by_format(format)
        .ok_or_else(|| CodecError::UnsupportedFormat(format!("extension .{ext}")))
}
