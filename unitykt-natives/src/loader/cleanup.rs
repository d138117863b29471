//! Post-load removal of extracted library files.
//!
//! POSIX-like filesystems let a file be unlinked while the process still has
//! it mapped, so the staged copy is deleted right after the load. Windows locks
//! a loaded DLL, so deletion is deferred to process exit; whatever still
//! cannot be removed then is picked up by the staging directory sweep of a
//! later run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, warn};

/// How an extracted file is removed once the load attempt is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Delete synchronously before the load call returns.
    DeleteImmediately,
    /// Record the file and delete it when the process exits.
    DeleteOnExit,
}

impl CleanupPolicy {
    /// Policy matching the host filesystem's locking behavior.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::DeleteOnExit
        } else {
            Self::DeleteImmediately
        }
    }

    /// Remove `path` according to this policy.
    ///
    /// Never fails: a leftover temp file is logged and otherwise ignored.
    pub fn cleanup(&self, path: &Path) {
        match self {
            Self::DeleteImmediately => {
                if let Err(e) = fs::remove_file(path) {
                    if e.kind() != io::ErrorKind::NotFound {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to delete extracted library"
                        );
                    }
                } else {
                    debug!(path = %path.display(), "Deleted extracted library");
                }
            }
            Self::DeleteOnExit => {
                delete_on_exit(path.to_path_buf());
                debug!(path = %path.display(), "Scheduled extracted library for deletion at exit");
            }
        }
    }
}

fn pending() -> &'static Mutex<Vec<PathBuf>> {
    static PENDING: OnceLock<Mutex<Vec<PathBuf>>> = OnceLock::new();
    PENDING.get_or_init(|| Mutex::new(Vec::new()))
}

/// Queue `path` for deletion when the process exits.
pub fn delete_on_exit(path: PathBuf) {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        // SAFETY: `run_at_exit` is a plain extern "C" fn that never unwinds.
        let status = unsafe { libc::atexit(run_at_exit) };
        if status != 0 {
            warn!("Failed to register exit-time cleanup; extracted libraries may be orphaned");
        }
    });

    pending().lock().push(path);
}

/// Paths currently queued for exit-time deletion.
pub fn pending_deletions() -> Vec<PathBuf> {
    pending().lock().clone()
}

/// Delete every queued path now, returning how many were removed.
///
/// The queue is drained either way; files that are still locked stay on disk.
pub fn run_pending_deletions() -> usize {
    run_pending_deletions_matching(|_| true)
}

/// Delete the queued paths accepted by `select`; the rest stay queued.
pub(crate) fn run_pending_deletions_matching(select: impl Fn(&Path) -> bool) -> usize {
    let paths: Vec<PathBuf> = {
        let mut queue = pending().lock();
        let (selected, kept) = std::mem::take(&mut *queue)
            .into_iter()
            .partition(|path| select(path));
        *queue = kept;
        selected
    };
    paths
        .iter()
        .filter(|path| match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Deferred delete failed");
                false
            }
        })
        .count()
}

extern "C" fn run_at_exit() {
    // Another thread may still hold the lock while the process exits.
    let paths = match pending().try_lock() {
        Some(mut guard) => std::mem::take(&mut *guard),
        None => return,
    };
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_host_policy() {
        #[cfg(windows)]
        assert_eq!(CleanupPolicy::for_host(), CleanupPolicy::DeleteOnExit);
        #[cfg(not(windows))]
        assert_eq!(CleanupPolicy::for_host(), CleanupPolicy::DeleteImmediately);
    }

    #[test]
    fn test_delete_immediately_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("foo_1.so");
        fs::write(&path, b"lib").unwrap();

        CleanupPolicy::DeleteImmediately.cleanup(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_immediately_ignores_missing_file() {
        let temp = TempDir::new().unwrap();
        CleanupPolicy::DeleteImmediately.cleanup(&temp.path().join("gone.so"));
    }

    #[test]
    fn test_delete_on_exit_defers() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("foo_2.dll");
        fs::write(&path, b"lib").unwrap();

        CleanupPolicy::DeleteOnExit.cleanup(&path);
        assert!(path.exists());
        assert!(pending_deletions().contains(&path));

        // Other tests may queue paths concurrently, so only drain ours.
        assert_eq!(run_pending_deletions_matching(|p| p == path), 1);
        assert!(!path.exists());
        assert!(!pending_deletions().contains(&path));
    }

    #[test]
    fn test_selective_drain_keeps_other_entries() {
        let temp = TempDir::new().unwrap();
        let drained = temp.path().join("foo_3.dll");
        let kept = temp.path().join("foo_4.dll");
        fs::write(&drained, b"lib").unwrap();
        fs::write(&kept, b"lib").unwrap();

        delete_on_exit(drained.clone());
        delete_on_exit(kept.clone());

        assert_eq!(run_pending_deletions_matching(|p| p == drained), 1);
        assert!(!drained.exists());
        assert!(kept.exists());
        assert!(!pending_deletions().contains(&drained));
        assert!(pending_deletions().contains(&kept));

        assert_eq!(run_pending_deletions_matching(|p| p == kept), 1);
        assert!(!kept.exists());
    }
}
