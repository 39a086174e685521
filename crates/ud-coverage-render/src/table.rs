// crates/ud-coverage-render/src/table.rs
// ============================================================================
// Module: Text Table Renderer
// Description: Folder-grouped fixed-width coverage table.
// Purpose: Terminal-friendly PASS/FAIL/N/A overview per feature and language.
// Dependencies: ud-coverage-core
// ============================================================================

//! ## Overview
//! Layout:
//!
//! ```text
//! Feature                   | Core     | Python
//! --------------------------|----------|---------
//! === AUTH =================================
//!   Private Key Auth        | PASS     | FAIL
//! ```
//!
//! The feature column is as wide as the longest indented title, folder
//! title, or the `Feature` header. Language columns are at least 8 wide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use ud_coverage_core::CoverageMatrix;
use ud_coverage_core::FeatureCoverage;
use ud_coverage_core::FeatureLanguage;
use ud_coverage_core::Language;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header of the feature column.
const FEATURE_HEADER: &str = "Feature";
/// Minimum width of a language column.
const MIN_LANGUAGE_WIDTH: usize = 8;
/// Indent applied to feature rows under a folder header.
const ROW_INDENT: usize = 2;
/// Output for a matrix with nothing to show.
pub const EMPTY_TABLE: &str = "No features found.\n";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the text table for `matrix`.
#[must_use]
pub fn render_table(matrix: &CoverageMatrix) -> String {
    if matrix.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let headers: Vec<String> = matrix.languages.iter().map(Language::display_name).collect();
    let folders = matrix.folders();
    let feature_width = matrix
        .features
        .iter()
        .map(|coverage| width(&coverage.feature.title) + ROW_INDENT)
        .chain(folders.iter().map(|(folder, _)| width(&folder_title(folder))))
        .fold(FEATURE_HEADER.len(), usize::max);
    let language_width =
        headers.iter().map(|header| width(header)).fold(MIN_LANGUAGE_WIDTH, usize::max);
    let total_width = feature_width + headers.len() * (language_width + 3);

    let mut out = String::new();
    let _ = write!(out, "{FEATURE_HEADER:<feature_width$}");
    for header in &headers {
        let _ = write!(out, " | {header:<language_width$}");
    }
    out.push('\n');
    out.push_str(&"-".repeat(feature_width));
    for _ in &headers {
        out.push_str("-|-");
        out.push_str(&"-".repeat(language_width));
    }
    out.push('\n');

    for (folder, features) in folders {
        let title = folder_title(folder).to_uppercase();
        out.push_str("=== ");
        out.push_str(&title);
        out.push(' ');
        out.push_str(&"=".repeat(total_width.saturating_sub(width(&title) + 4)));
        out.push('\n');
        for coverage in features {
            let title_width = feature_width - ROW_INDENT;
            out.push_str(&" ".repeat(ROW_INDENT));
            let _ = write!(out, "{:<title_width$}", coverage.feature.title);
            for language in &matrix.languages {
                let _ = write!(out, " | {:<language_width$}", cell(coverage, language));
            }
            out.push('\n');
        }
    }
    out
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Status text of one feature for one language.
fn cell(coverage: &FeatureCoverage, language: &Language) -> &'static str {
    match coverage.languages.get(language) {
        Some(FeatureLanguage::Present(result)) if result.implemented => "PASS",
        Some(FeatureLanguage::Present(_)) => "FAIL",
        Some(FeatureLanguage::NotPresent) | None => "N/A",
    }
}

/// Title-cases a folder bucket name (`result_set` becomes `Result Set`).
pub(crate) fn folder_title(folder: &str) -> String {
    folder
        .split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display width in characters.
fn width(text: &str) -> usize {
    text.chars().count()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_titles_are_title_cased() {
        assert_eq!(folder_title("result_set"), "Result Set");
        assert_eq!(folder_title("AUTH"), "Auth");
        assert_eq!(folder_title("other"), "Other");
    }
}
