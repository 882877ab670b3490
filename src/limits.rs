use crate::error::CodecError;

/// Decode guardrails for untrusted files.
///
/// The shape follows the byte-budget limits the PNG library exposes:
/// a cap on the decoded pixel buffer, plus a cap on either dimension
/// so absurd headers are rejected before any allocation. A default
/// `Limits` imposes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Limits {
    /// Largest accepted width or height, in pixels.
    pub max_dimension: Option<u32>,
    /// Largest accepted decoded pixel buffer, in bytes.
    pub max_alloc_bytes: Option<usize>,
}

impl Limits {
    /// Admit or reject an image whose header promises a
    /// `width` x `height` image decoding into `out_bytes` of pixels.
    ///
    /// Codecs call this once, between header parse and pixel buffer
    /// allocation.
    pub(crate) fn admit(
        &self,
        width: u32,
        height: u32,
        out_bytes: usize,
    ) -> Result<(), CodecError> {
        if let Some(cap) = self.max_dimension {
            if width.max(height) > cap {
                return Err(CodecError::LimitExceeded(format!(
                    "{width}x{height} exceeds the {cap} pixel dimension cap"
                )));
            }
        }
        if let Some(cap) = self.max_alloc_bytes {
            if out_bytes > cap {
                return Err(CodecError::LimitExceeded(format!(
                    "decoded buffer of {out_bytes} bytes exceeds the {cap} byte budget"
                )));
            }
        }
        Ok(())
    }
}
