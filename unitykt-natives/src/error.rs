//! Error types for native library acquisition.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::platform::PlatformTag;

/// Result type for loader operations.
pub type NativeResult<T> = Result<T, NativeError>;

/// Errors that can occur while resolving, extracting or loading a native library.
///
/// None of these are retried internally. Each one reflects a condition of the
/// host environment or of the build that a retry would not change, with the
/// exception of [`NativeError::ExtractionFailed`], where the caller may run the
/// whole load again (a fresh staging file name is generated each time).
#[derive(Debug, Error)]
pub enum NativeError {
    /// The host OS is not one of windows, darwin or linux.
    #[error("unsupported platform: {os_name}")]
    UnsupportedPlatform { os_name: String },

    /// No artifact was packaged for this platform.
    #[error(
        "native library not found: {path} (platform: {platform}); \
         ensure the library is compiled for your platform"
    )]
    LibraryResourceMissing { path: String, platform: PlatformTag },

    /// The staging directory could not be created.
    #[error("can't create staging directory {}: {source}", path.display())]
    StagingAreaUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying the resource into the staging directory failed.
    #[error("failed to extract native library {library}: {source}")]
    ExtractionFailed {
        library: String,
        #[source]
        source: io::Error,
    },

    /// The host's dynamic loader rejected the extracted file.
    #[error("failed to load native library {}: {source}", path.display())]
    LibraryLoadFailed {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A loaded library does not export an expected entry point.
    #[error("symbol {symbol} not found in {library}: {source}")]
    SymbolMissing {
        symbol: String,
        library: String,
        #[source]
        source: libloading::Error,
    },
}

impl NativeError {
    /// Whether running the same load again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExtractionFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Os;
    use std::error::Error as _;

    #[test]
    fn test_unsupported_platform_display() {
        let err = NativeError::UnsupportedPlatform {
            os_name: "plan9".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported platform: plan9");
    }

    #[test]
    fn test_resource_missing_mentions_path_and_platform() {
        let err = NativeError::LibraryResourceMissing {
            path: "/natives/linux-riscv64/libfoo.so".to_string(),
            platform: PlatformTag::new(Os::Linux, "riscv64"),
        };
        let message = err.to_string();
        assert!(message.contains("/natives/linux-riscv64/libfoo.so"));
        assert!(message.contains("linux-riscv64"));
    }

    #[test]
    fn test_staging_unavailable_chains_source() {
        let err = NativeError::StagingAreaUnavailable {
            path: PathBuf::from("/readonly/UnityKt_Deficuet"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/readonly/UnityKt_Deficuet"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_only_extraction_is_retryable() {
        let extraction = NativeError::ExtractionFailed {
            library: "foo".to_string(),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        let platform = NativeError::UnsupportedPlatform {
            os_name: "haiku".to_string(),
        };
        assert!(extraction.is_retryable());
        assert!(!platform.is_retryable());
    }
}
