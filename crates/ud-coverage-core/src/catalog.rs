// crates/ud-coverage-core/src/catalog.rs
// ============================================================================
// Module: Feature Catalog
// Description: Discovery and parsing of specification files under a workspace.
// Purpose: Produce the ordered feature list every later stage consumes.
// Dependencies: thiserror, tracing, walkdir
// ============================================================================

//! ## Overview
//! [`FeatureCatalog`] walks the specifications directory, parses every
//! `*.feature` file, and keeps raw file contents in its own [`SourceCache`].
//! The same cache later serves test source files to the scenario matcher, so
//! a report run reads each file at most once.
//!
//! ## Invariants
//! - Files are visited in sorted path order.
//! - A file that cannot be read is logged and skipped; the walk continues.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

use crate::cache::SourceCache;
use crate::feature::Feature;
use crate::feature::parse_feature;
use crate::language::LanguagePolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Extension of specification files.
const FEATURE_EXTENSION: &str = "feature";
/// Bucket for files not filed under a category directory.
pub const DEFAULT_FOLDER: &str = "other";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog failures for a single file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("cannot read {path}: {message}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying io message.
        message: String,
    },
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Specification discovery rooted at a workspace.
#[derive(Debug)]
pub struct FeatureCatalog {
    /// Workspace root; feature paths are recorded relative to it.
    root: PathBuf,
    /// Language alias rules applied to `@<lang>_expected` tags.
    policy: LanguagePolicy,
    /// Raw contents of every file read through this catalog.
    cache: SourceCache,
}

impl FeatureCatalog {
    /// Creates a catalog for the workspace at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, policy: LanguagePolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            cache: SourceCache::new(),
        }
    }

    /// Loads every specification under `features_dir` (relative to the root
    /// unless absolute), in sorted path order.
    pub fn load(&mut self, features_dir: &Path) -> Vec<Feature> {
        let specs_root = self.resolve(features_dir);
        if !specs_root.is_dir() {
            warn!(dir = %specs_root.display(), "specifications directory not found");
            return Vec::new();
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&specs_root).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().is_some_and(|ext| ext == FEATURE_EXTENSION)
                    {
                        files.push(path.to_path_buf());
                    }
                }
                Err(err) => warn!(error = %err, "skipping unreadable catalog entry"),
            }
        }
        files.sort();

        let mut features = Vec::with_capacity(files.len());
        for file in files {
            let folder = folder_bucket(&specs_root, &file);
            match self.load_file(&file, &folder) {
                Ok(feature) => {
                    debug!(
                        feature = %feature.path,
                        scenarios = feature.scenarios.len(),
                        "parsed specification"
                    );
                    features.push(feature);
                }
                Err(err) => warn!(error = %err, "specification skipped"),
            }
        }
        features
    }

    /// Parses one specification file into a feature in `folder`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] when the file cannot be read.
    pub fn load_file(&mut self, file: &Path, folder: &str) -> Result<Feature, CatalogError> {
        let relative = self.relative_path(file);
        let path = self.resolve(file);
        let text = self.cache.read(&path).map_err(|err| CatalogError::Read {
            path: relative.clone(),
            message: err.to_string(),
        })?;
        Ok(parse_feature(&relative, folder, text, &self.policy))
    }

    /// Returns the cached contents of a workspace file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] when the file cannot be read.
    pub fn source_text(&mut self, file: &Path) -> Result<&str, CatalogError> {
        let path = self.resolve(file);
        let display = self.relative_path(file);
        self.cache.read(&path).map_err(|err| CatalogError::Read {
            path: display,
            message: err.to_string(),
        })
    }

    /// Drops every cached file body.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of files currently cached.
    #[must_use]
    pub fn cached_files(&self) -> usize {
        self.cache.len()
    }

    /// Returns `file` relative to the workspace root with `/` separators.
    #[must_use]
    pub fn relative_path(&self, file: &Path) -> String {
        let relative = if file.is_absolute() {
            file.strip_prefix(&self.root).unwrap_or(file)
        } else {
            file
        };
        to_slash(relative)
    }

    /// Resolves a workspace-relative path against the root.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the presentation bucket of `file` below `specs_root`.
///
/// Files at least one directory below the root take their parent directory
/// name; files directly in the root, or outside it, fall into `other`.
#[must_use]
pub fn folder_bucket(specs_root: &Path, file: &Path) -> String {
    let Ok(relative) = file.strip_prefix(specs_root) else {
        return DEFAULT_FOLDER.to_string();
    };
    let depth = relative.components().filter(|c| matches!(c, Component::Normal(_))).count();
    if depth < 2 {
        return DEFAULT_FOLDER.to_string();
    }
    relative
        .parent()
        .and_then(Path::file_name)
        .map_or_else(|| DEFAULT_FOLDER.to_string(), |name| name.to_string_lossy().into_owned())
}

/// Joins normal path components with `/`, dropping `.` segments.
fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
