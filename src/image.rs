use crate::error::CodecError;

/// Encoded-format identity of an image, independent of its pixel layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    #[default]
    Unknown,
    Png,
    Jpeg,
    Bmp,
    Ppm,
    Pgm,
    Xbm,
    Xpm,
}

impl ImageFormat {
    /// Parse a canonical lowercase format tag (`"png"`, `"jpeg"`, ...).
    ///
    /// Unknown tags map to [`ImageFormat::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "png" => Self::Png,
            "jpeg" => Self::Jpeg,
            "bmp" => Self::Bmp,
            "ppm" => Self::Ppm,
            "pgm" => Self::Pgm,
            "xbm" => Self::Xbm,
            "xpm" => Self::Xpm,
            _ => Self::Unknown,
        }
    }

    /// Map a filename extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "bmp" => Self::Bmp,
            "ppm" => Self::Ppm,
            "pgm" => Self::Pgm,
            "xbm" => Self::Xbm,
            "xpm" => Self::Xpm,
            _ => Self::Unknown,
        }
    }

    /// Canonical lowercase tag for this format.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Ppm => "ppm",
            Self::Pgm => "pgm",
            Self::Xbm => "xbm",
            Self::Xpm => "xpm",
        }
    }
}

/// Semantic channel layout of a pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorType {
    Rgb,
    Rgba,
    Gray,
    GrayAlpha,
    Indexed,
    #[default]
    Unknown,
}

impl ColorType {
    /// Channel count: 3 for Rgb, 4 for Rgba, 1 for Gray, 2 for GrayAlpha,
    /// 1 for Indexed, 0 for Unknown.
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Indexed => 1,
            Self::Unknown => 0,
        }
    }

    /// Whether pixels of this layout carry an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba | Self::GrayAlpha)
    }
}

/// PNG interlace method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interlace {
    #[default]
    None,
    Adam7,
}

/// JPEG chroma subsampling ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Subsampling {
    S444,
    S422,
    #[default]
    S420,
    S411,
}

/// BMP compression method from the BITMAPINFOHEADER.
///
/// Only [`BmpCompression::Rgb`] round-trips; the rest are recognized on
/// decode and rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BmpCompression {
    #[default]
    Rgb,
    Rle8,
    Rle4,
    Bitfields,
}

impl BmpCompression {
    pub(crate) fn from_u32(num: u32) -> Option<Self> {
        match num {
            0 => Some(Self::Rgb),
            1 => Some(Self::Rle8),
            2 => Some(Self::Rle4),
            3 => Some(Self::Bitfields),
            _ => None,
        }
    }

    pub(crate) fn to_u32(self) -> u32 {
        match self {
            Self::Rgb => 0,
            Self::Rle8 => 1,
            Self::Rle4 => 2,
            Self::Bitfields => 3,
        }
    }
}

/// PNG state: interlace method recorded on decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PngParams {
    pub interlace: Interlace,
}

/// JPEG encode parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JpegParams {
    /// Quality 1..=100.
    pub quality: u8,
    pub subsampling: Subsampling,
    pub progressive: bool,
    /// Emit optimized Huffman tables.
    pub optimize: bool,
}

impl Default for JpegParams {
    fn default() -> Self {
        Self {
            quality: 85,
            subsampling: Subsampling::S420,
            progressive: false,
            optimize: true,
        }
    }
}

/// BMP header state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpParams {
    pub compression: BmpCompression,
    pub bpp: u16,
    pub colors_used: u32,
    pub important_colors: u32,
    /// Store rows top-down (negative height on disk).
    pub top_down: bool,
}

impl Default for BmpParams {
    fn default() -> Self {
        Self {
            compression: BmpCompression::Rgb,
            bpp: 24,
            colors_used: 0,
            important_colors: 0,
            top_down: false,
        }
    }
}

/// Netpbm variant state, shared by the PPM and PGM codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PnmParams {
    /// ASCII variant (P3/P2) instead of binary (P6/P5).
    pub ascii: bool,
    /// Sample range 1..=65535. Samples are rescaled to 0..255 in memory.
    pub max_val: u16,
}

impl Default for PnmParams {
    fn default() -> Self {
        Self {
            ascii: false,
            max_val: 255,
        }
    }
}

/// Per-format state carried by an [`Image`], tagged by its format.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FormatParams {
    #[default]
    None,
    Png(PngParams),
    Jpeg(JpegParams),
    Bmp(BmpParams),
    Pnm(PnmParams),
    /// XBM identifier parsed from (or emitted into) the C source.
    Xbm { name: String },
    /// XPM array identifier.
    Xpm { name: String },
}

impl FormatParams {
    /// Default parameter set for a format tag.
    pub fn default_for(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => Self::Png(PngParams::default()),
            ImageFormat::Jpeg => Self::Jpeg(JpegParams::default()),
            ImageFormat::Bmp => Self::Bmp(BmpParams::default()),
            ImageFormat::Ppm | ImageFormat::Pgm => Self::Pnm(PnmParams::default()),
            ImageFormat::Xbm => Self::Xbm {
                name: String::from("image"),
            },
            ImageFormat::Xpm => Self::Xpm {
                name: String::from("image"),
            },
            ImageFormat::Unknown => Self::None,
        }
    }
}

/// Header-level facts about an image file, available without decoding
/// the pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// The color type a full decode would produce.
    pub color_type: ColorType,
}

/// A decoded raster image.
///
/// The pixel buffer is exclusively owned and always `stride * height`
/// bytes; `stride` covers `width` pixels plus any trailing padding.
/// Sub-byte source depths (XBM, 1/2/4-bit PNG) are stored expanded to
/// one byte per sample, with the original depth kept in `bit_depth`.
#[derive(Clone, Debug)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Bytes per row, `>= width * channels * bytes_per_sample`.
    pub stride: usize,
    pub color_type: ColorType,
    /// Declared bits per channel sample of the source: 1, 2, 4, 8 or 16.
    pub bit_depth: u8,
    pub has_alpha: bool,
    pub is_opaque: bool,
    pub format: ImageFormat,
    pub params: FormatParams,
    pixels: Vec<u8>,
}

impl Image {
    /// Create a zero-filled 8-bit image ready for manual pixel fill.
    pub fn new(
        width: u32,
        height: u32,
        color_type: ColorType,
        format: ImageFormat,
    ) -> Result<Self, CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::InvalidArgument(format!(
                "zero dimension: {width}x{height}"
            )));
        }
        let channels = color_type.channels();
        if channels == 0 {
            return Err(CodecError::InvalidArgument(
                "cannot allocate an image with unknown color type".into(),
            ));
        }
        let stride = (width as usize)
            .checked_mul(channels)
            .ok_or(CodecError::DimensionsTooLarge { width, height })?;
        let len = stride
            .checked_mul(height as usize)
            .ok_or(CodecError::DimensionsTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            stride,
            color_type,
            bit_depth: 8,
            has_alpha: color_type.has_alpha(),
            is_opaque: !color_type.has_alpha(),
            format,
            params: FormatParams::default_for(format),
            pixels: vec![0; len],
        })
    }

    /// Assemble an image from a decoded buffer.
    ///
    /// The buffer length must be exactly `stride * height`.
    pub(crate) fn from_buffer(
        width: u32,
        height: u32,
        stride: usize,
        color_type: ColorType,
        bit_depth: u8,
        format: ImageFormat,
        pixels: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(pixels.len(), stride * height as usize);
        Self {
            width,
            height,
            stride,
            color_type,
            bit_depth,
            has_alpha: color_type.has_alpha(),
            is_opaque: !color_type.has_alpha(),
            format,
            params: FormatParams::default_for(format),
            pixels,
        }
    }

    /// Channel count for the image's color type; 0 when unknown.
    pub fn channels(&self) -> usize {
        self.color_type.channels()
    }

    /// Retag the image for another format, resetting `params` to that
    /// format's defaults. Used for cross-format conversion before save.
    pub fn set_format(&mut self, format: ImageFormat) {
        self.format = format;
        self.params = FormatParams::default_for(format);
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// One row of pixel data, without the stride padding.
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height);
        let bytes_per_sample = usize::from(self.bit_depth.div_ceil(8)).max(1);
        let row_bytes = self.width as usize * self.channels() * bytes_per_sample;
        let start = y as usize * self.stride;
        &self.pixels[start..start + row_bytes]
    }
}
