//! Configuration for the native library loader.

use std::path::PathBuf;

use crate::loader::CleanupPolicy;
use crate::platform::PlatformTag;

/// Product-specific folder created under the system temp root.
pub const DEFAULT_STAGING_DIR_NAME: &str = "UnityKt_Deficuet";

/// Root of the packaged artifact tree.
pub const DEFAULT_RESOURCE_PREFIX: &str = "/natives";

/// Configuration for [`NativeLoader`](crate::NativeLoader).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// System temp root the staging directory is created in.
    pub temp_root: PathBuf,

    /// Name of the staging directory under `temp_root`.
    ///
    /// Fixed across runs so restarts reuse the same directory.
    pub staging_dir_name: String,

    /// Prefix of packaged resource paths.
    pub resource_prefix: String,

    /// Platform to resolve artifacts for. `None` detects the host.
    pub platform: Option<PlatformTag>,

    /// Cleanup policy for extracted files. `None` picks one for the host.
    pub cleanup: Option<CleanupPolicy>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            temp_root: std::env::temp_dir(),
            staging_dir_name: DEFAULT_STAGING_DIR_NAME.to_string(),
            resource_prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
            platform: None,
            cleanup: None,
        }
    }
}

impl LoaderConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temp root.
    pub fn with_temp_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_root = path.into();
        self
    }

    /// Set the staging directory name.
    pub fn with_staging_dir_name(mut self, name: impl Into<String>) -> Self {
        self.staging_dir_name = name.into();
        self
    }

    /// Set the resource path prefix.
    pub fn with_resource_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.resource_prefix = prefix.into();
        self
    }

    /// Resolve artifacts for a fixed platform instead of the host.
    pub fn with_platform(mut self, platform: PlatformTag) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Override the host-selected cleanup policy.
    pub fn with_cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup = Some(policy);
        self
    }

    /// Full path of the staging directory.
    pub fn staging_path(&self) -> PathBuf {
        self.temp_root.join(&self.staging_dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Os;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.staging_dir_name, "UnityKt_Deficuet");
        assert_eq!(config.resource_prefix, "/natives");
        assert_eq!(config.temp_root, std::env::temp_dir());
        assert!(config.platform.is_none());
        assert!(config.cleanup.is_none());
    }

    #[test]
    fn test_staging_path() {
        let config = LoaderConfig::new().with_temp_root("/tmp/root");
        assert_eq!(
            config.staging_path(),
            PathBuf::from("/tmp/root/UnityKt_Deficuet")
        );
    }

    #[test]
    fn test_builder_pattern() {
        let config = LoaderConfig::new()
            .with_staging_dir_name("custom")
            .with_resource_prefix("/libs")
            .with_platform(PlatformTag::new(Os::Darwin, "arm64"))
            .with_cleanup(CleanupPolicy::DeleteOnExit);

        assert_eq!(config.staging_dir_name, "custom");
        assert_eq!(config.resource_prefix, "/libs");
        assert_eq!(config.platform.unwrap().to_string(), "darwin-aarch64");
        assert_eq!(config.cleanup, Some(CleanupPolicy::DeleteOnExit));
    }
}
