// crates/ud-coverage-validator/src/adapter.rs
// ============================================================================
// Module: Report Adapters
// Description: Shared interface for the validator's output dialects.
// Purpose: Let the bridge parse JSON and text output interchangeably.
// Dependencies: thiserror, ud-coverage-core
// ============================================================================

//! ## Overview
//! Both dialects produce a [`ValidatorReport`]. Adapters never fail the run;
//! the bridge downgrades an [`AdapterError`] to a warning and an empty report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;
use ud_coverage_core::LanguagePolicy;
use ud_coverage_core::ValidatorReport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Output could not be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The JSON document did not match the expected schema.
    #[error("malformed validator json: {0}")]
    Json(String),
    /// Text output contained no recognizable marker lines.
    #[error("unrecognized validator text output ({0} lines)")]
    Text(usize),
}

/// Inputs every adapter needs besides the raw output.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    /// Workspace root used to relativize reported paths.
    pub workspace: PathBuf,
    /// Language alias rules.
    pub policy: LanguagePolicy,
}

impl AdapterContext {
    /// Returns `path` relative to the workspace with `/` separators.
    ///
    /// Leading `./` is dropped; paths outside the workspace are kept as given.
    #[must_use]
    pub fn relativize(&self, path: &str) -> String {
        let slashed = path.trim().replace('\\', "/");
        let workspace = self.workspace.to_string_lossy().replace('\\', "/");
        let workspace = workspace.trim_end_matches('/');
        let stripped = if workspace.is_empty() {
            slashed.as_str()
        } else {
            slashed
                .strip_prefix(workspace)
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(&slashed)
        };
        let mut out = stripped;
        while let Some(rest) = out.strip_prefix("./") {
            out = rest;
        }
        out.to_string()
    }
}

/// Parser for one validator output dialect.
pub trait ReportAdapter {
    /// Parses raw validator stdout.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the output cannot be interpreted.
    fn parse(
        &self,
        output: &str,
        context: &AdapterContext,
    ) -> Result<ValidatorReport, AdapterError>;
}

// ============================================================================
// SECTION: Tests
// ============================================================================
