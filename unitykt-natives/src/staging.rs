//! Process-wide staging directory for extracted libraries.
//!
//! The directory sits at a fixed path (temp root + product folder) so that
//! restarts reuse it instead of piling up new directories. It is created on
//! first use, exactly once per process even when several threads load
//! libraries at the same time, and never removed.
//!
//! On first initialization, files left behind by earlier runs (extracted
//! libraries a Windows-like filesystem refused to delete) are swept
//! best-effort.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{NativeError, NativeResult};

/// Staged files younger than this are never swept; another process may be
/// between extraction and load.
pub const ORPHAN_MIN_AGE: Duration = Duration::from_secs(10 * 60);

/// Extensions of files the sweep may remove.
const LIBRARY_EXTENSIONS: &[&str] = &["dll", "so", "dylib"];

/// An initialized staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDirectory {
    path: PathBuf,
}

impl StagingDirectory {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lazily created staging directory.
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
    directory: OnceLock<StagingDirectory>,
    init_lock: Mutex<()>,
    creations: AtomicUsize,
}

impl StagingArea {
    /// Create an uninitialized staging area for `path`.
    ///
    /// Nothing touches the filesystem until [`directory`](Self::directory).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            directory: OnceLock::new(),
            init_lock: Mutex::new(()),
            creations: AtomicUsize::new(0),
        }
    }

    /// The process-wide staging area for `path`.
    ///
    /// Every caller asking for the same path shares one instance, and with it
    /// one initialization.
    pub fn shared(path: impl Into<PathBuf>) -> Arc<Self> {
        static AREAS: OnceLock<Mutex<HashMap<PathBuf, Arc<StagingArea>>>> = OnceLock::new();

        let path = path.into();
        AREAS
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .entry(path.clone())
            .or_insert_with(|| Arc::new(Self::new(path)))
            .clone()
    }

    /// Path of the directory, whether or not it exists yet.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether [`directory`](Self::directory) has already succeeded.
    pub fn is_initialized(&self) -> bool {
        self.directory.get().is_some()
    }

    /// Number of times this area initialized its directory (0 or 1).
    pub fn initializations(&self) -> usize {
        self.creations.load(Ordering::Acquire)
    }

    /// Get the staging directory, creating it on first use.
    ///
    /// A failed creation is not cached; the next call tries again.
    pub fn directory(&self) -> NativeResult<&StagingDirectory> {
        if let Some(dir) = self.directory.get() {
            return Ok(dir);
        }

        let _guard = self.init_lock.lock();
        if let Some(dir) = self.directory.get() {
            return Ok(dir);
        }

        let dir = self.initialize()?;
        self.creations.fetch_add(1, Ordering::AcqRel);
        Ok(self.directory.get_or_init(|| dir))
    }

    fn initialize(&self) -> NativeResult<StagingDirectory> {
        fs::create_dir_all(&self.path).map_err(|e| NativeError::StagingAreaUnavailable {
            path: self.path.clone(),
            source: e,
        })?;

        if !self.path.is_dir() {
            return Err(NativeError::StagingAreaUnavailable {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "staging path exists and is not a directory",
                ),
            });
        }

        debug!(path = %self.path.display(), "Staging directory ready");

        let swept = sweep_orphans(&self.path, ORPHAN_MIN_AGE);
        if swept > 0 {
            debug!(path = %self.path.display(), count = swept, "Removed orphaned libraries");
        }

        Ok(StagingDirectory {
            path: self.path.clone(),
        })
    }
}

/// Whether `name` looks like `{library}_{suffix}.{dll|so|dylib}`.
fn is_staged_library(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) => LIBRARY_EXTENSIONS.contains(&ext) && stem.contains('_'),
        None => false,
    }
}

/// Remove staged libraries older than `min_age`.
///
/// Failures are logged and skipped: a file still locked by a running process
/// cannot be deleted and is left for a later sweep.
fn sweep_orphans(dir: &Path, min_age: Duration) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Failed to scan staging directory");
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_candidate = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(is_staged_library)
            .unwrap_or(false);
        if !is_candidate || !path.is_file() {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if !matches!(age, Some(age) if age >= min_age) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Orphaned library still in use");
            }
        }
    }

    removed
}
