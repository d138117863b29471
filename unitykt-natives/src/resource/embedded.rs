//! Resources compiled into the binary.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use super::ResourceProvider;

/// In-memory resource table keyed by resource path.
///
/// ```ignore
/// use unitykt_natives::EmbeddedResources;
///
/// let resources = EmbeddedResources::new().with_resource(
///     "/natives/linux-x86_64/libtexturedecoder.so",
///     include_bytes!("../natives/linux-x86_64/libtexturedecoder.so"),
/// );
/// ```
#[derive(Debug, Default, Clone)]
pub struct EmbeddedResources {
    entries: HashMap<String, Cow<'static, [u8]>>,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static byte slice under `path`.
    pub fn with_resource(mut self, path: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.entries.insert(path.into(), Cow::Borrowed(bytes));
        self
    }

    /// Register owned bytes under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(path.into(), Cow::Owned(bytes));
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceProvider for EmbeddedResources {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send + '_>> {
        match self.entries.get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(&bytes[..]))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no embedded resource at {}", path),
            )),
        }
    }
}
