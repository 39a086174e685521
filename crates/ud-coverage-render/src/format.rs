// crates/ud-coverage-render/src/format.rs
// ============================================================================
// Module: Report Formats
// Description: Output format selection and renderer options.
// Purpose: Dispatch a coverage matrix to the table or HTML renderer.
// Dependencies: serde, ud-coverage-core
// ============================================================================

//! ## Overview
//! [`ReportFormat`] names the two supported outputs and [`RenderOptions`]
//! carries the presentation settings that do not live in the matrix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use ud_coverage_core::CoverageMatrix;

use crate::html::render_html;
use crate::table::render_table;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Document title used when none is configured.
pub const DEFAULT_TITLE: &str = "Universal Driver Test Coverage Report";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Plain-text table grouped by folder.
    Table,
    /// Self-contained tabbed HTML document.
    #[default]
    Html,
}

impl ReportFormat {
    /// Renders `matrix` in this format.
    #[must_use]
    pub fn render(self, matrix: &CoverageMatrix, options: &RenderOptions) -> String {
        match self {
            Self::Table => render_table(matrix),
            Self::Html => render_html(matrix, options),
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Presentation settings for the HTML renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Document title and top-level heading.
    pub title: String,
    /// Optional URL prefix for source deep links.
    pub source_link_base: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            source_link_base: None,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
