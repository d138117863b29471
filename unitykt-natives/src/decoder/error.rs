//! Error types for decode calls.

use thiserror::Error;

use super::format::TextureFormat;
use crate::error::NativeError;

/// Errors returned by [`TextureDecoder`](super::TextureDecoder) methods.
///
/// Argument checks run before any native code is called, so a bad buffer is
/// reported here instead of corrupting memory.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Width or height is zero or too large for the native ABI.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// ASTC block size outside the supported set.
    #[error("invalid ASTC block size {0}")]
    InvalidBlockSize(u32),

    /// Compressed input shorter than the image needs.
    #[error("{format} input too small: need {required} bytes, got {actual}")]
    InputTooSmall {
        format: TextureFormat,
        required: usize,
        actual: usize,
    },

    /// Output buffer cannot hold `width * height` 32-bit pixels.
    #[error("output buffer too small: need {required} bytes, got {actual}")]
    OutputTooSmall { required: usize, actual: usize },

    /// The native decoder reported failure.
    #[error("{format} decode failed with code {code}")]
    DecodeFailed { format: TextureFormat, code: i32 },

    /// The decoder library lacks the entry point.
    #[error(transparent)]
    Native(#[from] NativeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_too_small_display() {
        let err = DecodeError::InputTooSmall {
            format: TextureFormat::Dxt1,
            required: 8,
            actual: 1,
        };
        assert_eq!(err.to_string(), "DXT1 input too small: need 8 bytes, got 1");
    }

    #[test]
    fn test_decode_failed_display() {
        let err = DecodeError::DecodeFailed {
            format: TextureFormat::Astc { block_size: 4 },
            code: 0,
        };
        assert_eq!(err.to_string(), "ASTC 4x4 decode failed with code 0");
    }
}
