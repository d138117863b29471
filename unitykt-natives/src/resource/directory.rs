//! Resources shipped as an on-disk tree.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use super::ResourceProvider;

/// Serves resource paths from a directory on disk.
///
/// `/natives/linux-x86_64/libfoo.so` resolves to
/// `{root}/natives/linux-x86_64/libfoo.so`.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resources shipped next to the running executable.
    pub fn beside_executable() -> io::Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory")
        })?;
        Ok(Self::new(dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a resource path to a file under the root.
    ///
    /// Paths that would escape the root are rejected.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid resource path: {}", path),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceProvider for DirectoryResources {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send + '_>> {
        let file = File::open(self.resolve(path)?)?;
        Ok(Box::new(BufReader::new(file)))
    }
}
