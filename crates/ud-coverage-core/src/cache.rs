// crates/ud-coverage-core/src/cache.rs
// ============================================================================
// Module: Source Content Cache
// Description: Per-instance cache of raw file contents keyed by absolute path.
// Purpose: Avoid re-reading specification and test files within one run.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The catalog and the matcher both read files from the workspace. A
//! [`SourceCache`] is owned by the [`crate::FeatureCatalog`] instance, so two
//! report runs in one process never observe each other's contents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a single cached file.
pub const MAX_SOURCE_BYTES: u64 = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Raw file contents keyed by absolute path.
#[derive(Debug, Default)]
pub struct SourceCache {
    /// Cached contents; invalid UTF-8 is replaced lossily.
    entries: HashMap<PathBuf, String>,
}

impl SourceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents of `path`, reading it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when the file cannot be read or exceeds
    /// [`MAX_SOURCE_BYTES`].
    pub fn read(&mut self, path: &Path) -> io::Result<&str> {
        let key = absolute(path)?;
        if !self.entries.contains_key(&key) {
            let size = fs::metadata(&key)?.len();
            if size > MAX_SOURCE_BYTES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("file exceeds {MAX_SOURCE_BYTES} bytes"),
                ));
            }
            let bytes = fs::read(&key)?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            self.entries.insert(key.clone(), text);
        }
        self.entries
            .get(&key)
            .map(String::as_str)
            .ok_or_else(|| io::Error::other("cache entry vanished"))
    }

    /// Number of cached files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Resolves `path` against the current directory without touching symlinks.
fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        std::path::absolute(path)
    }
}
