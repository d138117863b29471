//! Native library acquisition pipeline.
//!
//! A load runs every step end to end; nothing is cached between calls:
//!
//! ```text
//! PlatformTag ──► ResourceLocator ──► extract() ──► NativeLibrary::open
//!  (detect)        /natives/{os}-{arch}/…   │ (staging dir)      │
//!                                           └──── CleanupPolicy ◄┘
//! ```
//!
//! The cleanup step runs whether or not the load succeeded, and its failures
//! are only logged. Every other failure is returned to the caller.
//!
//! # Example
//!
//! ```ignore
//! use unitykt_natives::{DirectoryResources, NativeLoader};
//!
//! let loader = NativeLoader::new(DirectoryResources::beside_executable()?)?;
//! let library = loader.load_library_from_jar("texturedecoder")?;
//! ```

mod cleanup;
mod library;

pub use cleanup::{delete_on_exit, pending_deletions, run_pending_deletions, CleanupPolicy};
pub use library::NativeLibrary;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::error::NativeResult;
use crate::extractor::{self, ExtractedFile};
use crate::platform::PlatformTag;
use crate::resource::{ResourceLocator, ResourceProvider};
use crate::staging::StagingArea;

/// Loads packaged native libraries for one platform.
pub struct NativeLoader {
    locator: ResourceLocator,
    staging: Arc<StagingArea>,
    cleanup: CleanupPolicy,
    resources: Arc<dyn ResourceProvider>,
}

impl NativeLoader {
    /// Create a loader for the host platform with the default configuration.
    pub fn new(resources: impl ResourceProvider + 'static) -> NativeResult<Self> {
        Self::with_config(LoaderConfig::default(), resources)
    }

    /// Create a loader from an explicit configuration.
    ///
    /// Fails with `UnsupportedPlatform` if no platform is configured and the
    /// host OS is not recognized.
    pub fn with_config(
        config: LoaderConfig,
        resources: impl ResourceProvider + 'static,
    ) -> NativeResult<Self> {
        let platform = match config.platform.clone() {
            Some(platform) => platform,
            None => PlatformTag::detect()?,
        };
        let staging = StagingArea::shared(config.staging_path());
        let cleanup = config.cleanup.unwrap_or_else(CleanupPolicy::for_host);

        debug!(
            platform = %platform,
            staging = %staging.path().display(),
            cleanup = ?cleanup,
            "Native loader configured"
        );

        Ok(Self {
            locator: ResourceLocator::new(config.resource_prefix, platform),
            staging,
            cleanup,
            resources: Arc::new(resources),
        })
    }

    pub fn platform(&self) -> &PlatformTag {
        self.locator.platform()
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn cleanup_policy(&self) -> CleanupPolicy {
        self.cleanup
    }

    /// Extract the packaged library `name` and load it into the process.
    ///
    /// The extracted file is removed (or scheduled for removal) before this
    /// returns, whether the load succeeded or not.
    pub fn load_library_from_jar(&self, name: &str) -> NativeResult<NativeLibrary> {
        let extracted = self.extract(name)?;

        debug!(library = %name, path = %extracted.path().display(), "Loading native library");
        let loaded = NativeLibrary::open(name, extracted.path());
        self.cleanup.cleanup(extracted.path());

        let library = loaded?;
        info!(library = %name, platform = %self.platform(), "Native library loaded");
        Ok(library)
    }

    /// Legacy form of [`load_library_from_jar`](Self::load_library_from_jar).
    ///
    /// The extension is derived from the platform; `ext` is ignored.
    #[deprecated(note = "use `load_library_from_jar(name)` instead")]
    pub fn load_library_from_jar_with_ext(
        &self,
        name: &str,
        _ext: &str,
    ) -> NativeResult<NativeLibrary> {
        self.load_library_from_jar(name)
    }

    /// Resolve and extract `name` without loading it.
    pub fn extract(&self, name: &str) -> NativeResult<ExtractedFile> {
        let (_, stream) = self.locator.open(self.resources.as_ref(), name)?;
        let staging = self.staging.directory()?;
        let extension = self.platform().os().library_extension();
        extractor::extract(stream, name, extension, staging)
    }
}

impl std::fmt::Debug for NativeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLoader")
            .field("locator", &self.locator)
            .field("staging", &self.staging)
            .field("cleanup", &self.cleanup)
            .finish_non_exhaustive()
    }
}
