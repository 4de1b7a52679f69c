//! Sources of command text referenced by path.
//!
//! `file = <path>` inputs and `#paste(<path>)` directives ask every
//! registered [`Loader`] in turn; the first non-empty answer wins.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::result::{Failure, Resolved};

/// Loads command text by path.
pub trait Loader: Send + Sync {
    /// Returns the text at `path`, or `None` if this loader has nothing
    /// there.
    ///
    /// # Errors
    /// Fails if the text exists but could not be read.
    fn load(&self, path: &str) -> io::Result<Option<String>>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> io::Result<Option<String>> + Send + Sync,
{
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        self(path)
    }
}

/// Texts registered up front, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Adds or replaces a text.
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl Loader for MemoryLoader {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }
}

/// Reads files relative to a directory.
#[derive(Clone, Debug)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    /// Loads from below `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Loader for DirectoryLoader {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        let file = self.root.join(path);
        if !file.exists() {
            return Ok(None);
        }
        fs::read_to_string(file).map(Some)
    }
}

/// Loaders consulted in registration order.
#[derive(Clone, Default)]
pub struct Loaders {
    loaders: Vec<Arc<dyn Loader>>,
}

impl Loaders {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a loader.
    pub fn push(&mut self, loader: impl Loader + 'static) {
        self.loaders.push(Arc::new(loader));
    }

    /// Number of loaders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Returns true if no loader is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// The first non-empty text any loader has at `path`. Read failures are
    /// logged and the next loader is asked.
    ///
    /// # Errors
    /// Fails at `position` if no loader has the path.
    pub fn find(&self, path: &str, position: usize) -> Resolved<String> {
        for loader in &self.loaders {
            match loader.load(path) {
                Ok(Some(text)) if !text.is_empty() => {
                    debug!(path, bytes = text.len(), "loaded command input");
                    return Ok(text);
                }
                Ok(_) => {}
                Err(error) => warn!(path, %error, "loader failed to read command input"),
            }
        }
        Err(Failure::at(
            position,
            format!("No valid loader path '{path}' found"),
        ))
    }
}
