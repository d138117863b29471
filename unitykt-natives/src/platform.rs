//! Host platform identification.
//!
//! Maps the OS name and architecture strings reported by the host onto a
//! [`PlatformTag`], which selects the packaged artifact directory
//! (`{os}-{arch}`) and the OS library file naming convention.
//!
//! Classification is by substring on the lowercased OS name:
//!
//! | OS name contains   | [`Os`]          | Library file name  |
//! |--------------------|-----------------|--------------------|
//! | `mac` or `darwin`  | `Os::Darwin`    | `lib{name}.dylib`  |
//! | `win`              | `Os::Windows`   | `{name}.dll`       |
//! | `nux` or `nix`     | `Os::Linux`     | `lib{name}.so`     |
//!
//! Rows are checked top to bottom.
//!
//! Architectures are normalized leniently: an unknown architecture is passed
//! through lowercased instead of failing, so it surfaces later as a missing
//! resource rather than as an unsupported platform.

use std::fmt;
use std::sync::OnceLock;

use crate::error::{NativeError, NativeResult};

/// Operating systems with a packaged artifact layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Darwin,
    Linux,
}

impl Os {
    /// Classify a host-reported OS name.
    pub fn classify(os_name: &str) -> NativeResult<Self> {
        let name = os_name.to_lowercase();
        // "darwin" contains "win", so it must be matched first.
        if name.contains("mac") || name.contains("darwin") {
            Ok(Self::Darwin)
        } else if name.contains("win") {
            Ok(Self::Windows)
        } else if name.contains("nux") || name.contains("nix") {
            Ok(Self::Linux)
        } else {
            Err(NativeError::UnsupportedPlatform {
                os_name: os_name.to_string(),
            })
        }
    }

    /// Directory component used in resource paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }

    /// File name of a shared library called `name` on this OS.
    pub fn library_file_name(&self, name: &str) -> String {
        match self {
            Self::Windows => format!("{}.dll", name),
            Self::Darwin => format!("lib{}.dylib", name),
            Self::Linux => format!("lib{}.so", name),
        }
    }

    /// Shared library extension, without the dot.
    pub fn library_extension(&self) -> &'static str {
        match self {
            Self::Windows => "dll",
            Self::Darwin => "dylib",
            Self::Linux => "so",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library file name for `name` given a raw host OS name.
///
/// Fails with [`NativeError::UnsupportedPlatform`] when the OS name matches
/// none of the known families.
pub fn filename_for(name: &str, os_name: &str) -> NativeResult<String> {
    Ok(Os::classify(os_name)?.library_file_name(name))
}

/// Normalize a host-reported architecture string.
pub fn normalize_arch(arch: &str) -> String {
    let arch = arch.to_lowercase();
    if arch.contains("amd64") || arch.contains("x86_64") {
        "x86_64".to_string()
    } else if arch.contains("aarch64") || arch.contains("arm64") {
        "aarch64".to_string()
    } else if arch.contains("arm") {
        "arm".to_string()
    } else {
        arch
    }
}

/// Canonical `{os, arch}` pair used to select a packaged artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformTag {
    os: Os,
    arch: String,
}

impl PlatformTag {
    /// Create a tag from an already classified OS; `arch` is normalized.
    pub fn new(os: Os, arch: &str) -> Self {
        Self {
            os,
            arch: normalize_arch(arch),
        }
    }

    /// Build a tag from raw OS name and architecture strings.
    pub fn from_host_strings(os_name: &str, arch: &str) -> NativeResult<Self> {
        Ok(Self::new(Os::classify(os_name)?, arch))
    }

    /// Identify the running host.
    ///
    /// The host strings are read once per process; later calls return the
    /// same tag (or the same failure).
    pub fn detect() -> NativeResult<Self> {
        static HOST: OnceLock<Result<PlatformTag, String>> = OnceLock::new();

        let os_name = std::env::consts::OS;
        HOST.get_or_init(|| {
            Self::from_host_strings(os_name, std::env::consts::ARCH)
                .map_err(|_| os_name.to_string())
        })
        .clone()
        .map_err(|os_name| NativeError::UnsupportedPlatform { os_name })
    }

    pub fn os(&self) -> Os {
        self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// File name of a shared library called `name` on this platform.
    pub fn library_file_name(&self, name: &str) -> String {
        self.os.library_file_name(name)
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
