//! UnityKt natives - packaged native library loading
//!
//! Resolves the prebuilt shared library matching the host platform, copies it
//! out of the packaged resources into a staging directory, loads it into the
//! process and removes the staged copy again. The texture decoder library is
//! exposed on top of that through [`TextureDecoder`].
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌────────────┐   ┌──────────────┐
//! │ PlatformTag  │──►│ ResourceLocator │──►│ extract()  │──►│ NativeLoader │
//! │ linux-x86_64 │   │ /natives/…/…so  │   │ staging/   │   │ load+cleanup │
//! └──────────────┘   └─────────────────┘   └────────────┘   └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use unitykt_natives::{EmbeddedResources, NativeLoader, TextureDecoder};
//!
//! let resources = EmbeddedResources::new().with_resource(
//!     "/natives/linux-x86_64/libtexturedecoder.so",
//!     include_bytes!("../natives/linux-x86_64/libtexturedecoder.so"),
//! );
//! let loader = NativeLoader::new(resources)?;
//! let decoder = TextureDecoder::load(&loader)?;
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod logging;
pub mod platform;
pub mod resource;
pub mod staging;

pub use config::LoaderConfig;
pub use decoder::{DecodeError, TextureDecoder, TextureFormat};
pub use error::{NativeError, NativeResult};
pub use extractor::ExtractedFile;
pub use loader::{CleanupPolicy, NativeLibrary, NativeLoader};
pub use platform::{Os, PlatformTag};
pub use resource::{DirectoryResources, EmbeddedResources, ResourceLocator, ResourceProvider};
pub use staging::{StagingArea, StagingDirectory};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
