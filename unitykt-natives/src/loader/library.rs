//! Handle to a library loaded into the process.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::error::{NativeError, NativeResult};

/// A shared library mapped into the current process.
///
/// The code stays mapped for as long as the handle lives, even after the file
/// it was loaded from has been deleted.
#[derive(Debug)]
pub struct NativeLibrary {
    library: Library,
    name: String,
    path: PathBuf,
}

impl NativeLibrary {
    /// Load the library file at `path`.
    pub fn open(name: &str, path: &Path) -> NativeResult<Self> {
        // SAFETY: loading runs the library's initializers. Callers only pass
        // artifacts packaged with this crate or found by the system loader.
        let library = unsafe { Library::new(path) }.map_err(|e| NativeError::LibraryLoadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            library,
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// Load `file_name` through the host's standard library search path.
    pub fn open_system(name: &str, file_name: &str) -> NativeResult<Self> {
        Self::open(name, Path::new(file_name))
    }

    /// Logical name the library was loaded as.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the library was loaded from. It may no longer exist.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up an exported symbol.
    ///
    /// # Safety
    ///
    /// `T` must match the actual type of the exported symbol.
    pub unsafe fn get<T>(&self, symbol: &str) -> NativeResult<Symbol<'_, T>> {
        let mut bytes = Vec::with_capacity(symbol.len() + 1);
        bytes.extend_from_slice(symbol.as_bytes());
        bytes.push(0);

        self.library
            .get(&bytes)
            .map_err(|e| NativeError::SymbolMissing {
                symbol: symbol.to_string(),
                library: self.name.clone(),
                source: e,
            })
    }

    /// Whether `symbol` is exported.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        // SAFETY: the pointer is never called or dereferenced.
        unsafe { self.get::<*const ()>(symbol).is_ok() }
    }
}
