//! Packaged native artifact lookup.
//!
//! Every supported platform ships exactly one artifact per library, laid out
//! as:
//!
//! ```text
//! /natives/
//! ├── windows-x86_64/texturedecoder.dll
//! ├── darwin-aarch64/libtexturedecoder.dylib
//! ├── linux-x86_64/libtexturedecoder.so
//! └── linux-aarch64/libtexturedecoder.so
//! ```
//!
//! Where those bytes live is abstracted by [`ResourceProvider`]:
//!
//! - [`EmbeddedResources`] - slices compiled into the binary (`include_bytes!`)
//! - [`DirectoryResources`] - an on-disk tree with the same layout
//!
//! [`ResourceLocator`] builds the path for a logical library name and opens it,
//! turning an absent artifact into [`NativeError::LibraryResourceMissing`].

mod directory;
mod embedded;

pub use directory::DirectoryResources;
pub use embedded::EmbeddedResources;

use std::io::{self, Read};

use tracing::debug;

use crate::error::{NativeError, NativeResult};
use crate::platform::PlatformTag;

/// Read-only access to packaged resources.
pub trait ResourceProvider: Send + Sync {
    /// Open the resource at `path` (e.g. `/natives/linux-x86_64/libfoo.so`).
    ///
    /// An absent resource is reported as [`io::ErrorKind::NotFound`].
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send + '_>>;
}

/// Resolves logical library names to packaged resource paths for one platform.
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    prefix: String,
    platform: PlatformTag,
}

impl ResourceLocator {
    pub fn new(prefix: impl Into<String>, platform: PlatformTag) -> Self {
        Self {
            prefix: prefix.into(),
            platform,
        }
    }

    pub fn platform(&self) -> &PlatformTag {
        &self.platform
    }

    /// `{prefix}/{os}-{arch}/{library file name}`.
    pub fn resource_path_for(&self, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.prefix.trim_end_matches('/'),
            self.platform,
            self.platform.library_file_name(name)
        )
    }

    /// Open the artifact for `name` from `provider`.
    ///
    /// Returns the resolved path alongside the stream.
    pub fn open<'a>(
        &self,
        provider: &'a dyn ResourceProvider,
        name: &str,
    ) -> NativeResult<(String, Box<dyn Read + Send + 'a>)> {
        let path = self.resource_path_for(name);
        debug!(library = %name, path = %path, "Opening packaged native library");

        match provider.open(&path) {
            Ok(stream) => Ok((path, stream)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(NativeError::LibraryResourceMissing {
                    path,
                    platform: self.platform.clone(),
                })
            }
            Err(e) => Err(NativeError::ExtractionFailed {
                library: name.to_string(),
                source: e,
            }),
        }
    }
}
