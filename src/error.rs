use std::io;
use std::path::PathBuf;

/// Errors from image decoding/encoding and the codec facade.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,
}

impl CodecError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CodecError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<png::DecodingError> for CodecError {
    fn from(err: png::DecodingError) -> Self {
        CodecError::Decode(err.to_string())
    }
}

impl From<png::EncodingError> for CodecError {
    fn from(err: png::EncodingError) -> Self {
        CodecError::Encode(err.to_string())
    }
}

impl From<jpeg::Error> for CodecError {
    fn from(err: jpeg::Error) -> Self {
        match err {
            jpeg::Error::Unsupported(feature) => {
                CodecError::UnsupportedFormat(format!("JPEG feature {feature:?}"))
            }
            other => CodecError::Decode(other.to_string()),
        }
    }
}

impl From<jpeg_encoder::EncodingError> for CodecError {
    fn from(err: jpeg_encoder::EncodingError) -> Self {
        CodecError::Encode(err.to_string())
    }
}
