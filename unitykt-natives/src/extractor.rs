//! Materializes packaged libraries as real files.
//!
//! The host loader needs a path on disk, so each load copies the artifact into
//! the staging directory under a fresh name `{library}_{random}.{ext}`. The
//! random part keeps concurrent loads (and other processes sharing the
//! staging directory) from ever writing the same file; the extension is kept
//! because some loaders refuse files without the expected one.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;
use tracing::debug;

use crate::error::{NativeError, NativeResult};
use crate::staging::StagingDirectory;

/// Length of the random part of a staged file name.
const UNIQUE_SUFFIX_LEN: usize = 12;

/// A library copied into the staging directory, not yet loaded.
#[derive(Debug, PartialEq, Eq)]
pub struct ExtractedFile {
    library: String,
    path: PathBuf,
    size: u64,
}

impl ExtractedFile {
    /// Logical name of the library this file was extracted for.
    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes written.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Copy `stream` into a uniquely named file inside `staging`.
///
/// `extension` is the target library extension without the dot. The stream is
/// consumed and dropped on every path. If the copy fails the partial file is
/// removed before the error is returned.
pub fn extract(
    mut stream: impl Read,
    library: &str,
    extension: &str,
    staging: &StagingDirectory,
) -> NativeResult<ExtractedFile> {
    let failed = |source: io::Error| NativeError::ExtractionFailed {
        library: library.to_string(),
        source,
    };

    let prefix = format!("{}_", library);
    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{}", extension)
    };

    let mut file = Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .rand_bytes(UNIQUE_SUFFIX_LEN)
        .tempfile_in(staging.path())
        .map_err(failed)?;

    let copied = io::copy(&mut stream, file.as_file_mut()).and_then(|n| {
        file.as_file_mut().flush()?;
        Ok(n)
    });

    let size = match copied {
        Ok(n) => n,
        Err(e) => {
            let partial = file.path().to_path_buf();
            // Closing the temp file deletes it.
            if let Err(close_err) = file.close() {
                debug!(
                    path = %partial.display(),
                    error = %close_err,
                    "Failed to remove partially extracted library"
                );
            }
            return Err(failed(e));
        }
    };

    // Release the handle so the loader (and a later delete) sees a closed file.
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| failed(e.error))?;

    debug!(
        library = %library,
        path = %path.display(),
        bytes = size,
        "Extracted native library"
    );

    Ok(ExtractedFile {
        library: library.to_string(),
        path,
        size,
    })
}
