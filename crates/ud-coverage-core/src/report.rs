// crates/ud-coverage-core/src/report.rs
// ============================================================================
// Module: Validator Report Model
// Description: Normalized validator results and the adapter seam that feeds them.
// Purpose: Keep the matrix builder agnostic to how validator output was parsed.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The external validator speaks two dialects (a JSON document and a glyph
//! decorated text log). Both are parsed into [`ValidatorReport`], and the
//! bridge that produces it implements [`ValidatorSource`]. Breaking changes
//! and behavior differences share one record shape tagged by
//! [`CrossReferenceKind`].
//!
//! ## Invariants
//! - Language keys are canonical (aliases already applied).
//! - Cross-reference records are grouped per kind and sorted by id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::language::Language;

// ============================================================================
// SECTION: Scenario Status
// ============================================================================

/// Static verification status of one scenario for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ScenarioStatus {
    /// An implementation was located with no missing steps.
    Pass,
    /// The validator flagged the scenario as missing or incomplete.
    Fail,
}

impl ScenarioStatus {
    /// Returns the uppercase label used by the text table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

// ============================================================================
// SECTION: Validation Results
// ============================================================================

/// Validator verdict for one feature in one language.
///
/// # Invariants
/// - `failed_scenarios` holds scenario names exactly as the validator spelled
///   them; scenarios not listed take `default_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageValidation {
    /// Canonical language key.
    pub language: Language,
    /// Whether the feature is fully implemented for this language.
    pub implemented: bool,
    /// Workspace-relative test file path, when one was located.
    pub source_path: Option<String>,
    /// Scenarios the validator explicitly flagged.
    pub failed_scenarios: BTreeSet<String>,
    /// Status of scenarios that were not flagged.
    pub default_status: ScenarioStatus,
}

impl LanguageValidation {
    /// Returns the status of `scenario` under this validation.
    #[must_use]
    pub fn status_of(&self, scenario: &str) -> ScenarioStatus {
        if self.failed_scenarios.contains(scenario) {
            ScenarioStatus::Fail
        } else {
            self.default_status
        }
    }
}

/// Validator verdicts for one feature file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FeatureValidation {
    /// Feature path as reported by the validator (workspace-relative when possible).
    pub feature_path: String,
    /// Per-language verdicts.
    pub languages: BTreeMap<Language, LanguageValidation>,
}

// ============================================================================
// SECTION: Cross References
// ============================================================================

/// Kind discriminant for tracked divergences between implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CrossReferenceKind {
    /// Intentional incompatible change between driver generations.
    BreakingChange,
    /// Known behavioral divergence between implementations.
    BehaviorDifference,
}

impl CrossReferenceKind {
    /// All kinds in presentation order.
    pub const ALL: [Self; 2] = [Self::BreakingChange, Self::BehaviorDifference];

    /// Human label for the kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BreakingChange => "Breaking Change",
            Self::BehaviorDifference => "Behavior Difference",
        }
    }

    /// Plural section heading.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::BreakingChange => "Breaking Changes",
            Self::BehaviorDifference => "Behavior Differences",
        }
    }

    /// Prefix used for HTML anchors.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::BreakingChange => "bc",
            Self::BehaviorDifference => "bd",
        }
    }

    /// Top-level key of this kind in the validator JSON document.
    #[must_use]
    pub const fn report_key(self) -> &'static str {
        match self {
            Self::BreakingChange => "breaking_changes_report",
            Self::BehaviorDifference => "behavior_differences_report",
        }
    }
}

/// A file and 1-based line inside it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourceLocation {
    /// Workspace-relative file path.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
}

/// A test asserting a cross-referenced behavior.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Implementation {
    /// Test method name.
    pub test_method: String,
    /// Workspace-relative test file.
    pub test_file: String,
    /// 1-based line of the test method, when the validator reported one.
    pub test_line: Option<usize>,
    /// Where the old behavior is asserted, if separate.
    pub old_behavior: Option<SourceLocation>,
    /// Where the new behavior is asserted, if separate.
    pub new_behavior: Option<SourceLocation>,
}

/// A breaking change or behavior difference with its per-language tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReferenceRecord {
    /// Kind of divergence.
    pub kind: CrossReferenceKind,
    /// Identifier assigned by the specification authors.
    pub id: String,
    /// Human description.
    pub description: String,
    /// Implementations keyed by canonical language.
    pub implementations: BTreeMap<Language, Vec<Implementation>>,
}

impl CrossReferenceRecord {
    /// Returns the HTML anchor id of this record.
    #[must_use]
    pub fn anchor(&self) -> String {
        anchor_for(self.kind, &self.id)
    }
}

/// Builds the HTML anchor id for a record of `kind` named `id`.
#[must_use]
pub fn anchor_for(kind: CrossReferenceKind, id: &str) -> String {
    let id: String = id
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{id}", kind.slug())
}

/// Cross-reference records grouped by kind, each list sorted by id.
pub type CrossReferenceData = BTreeMap<CrossReferenceKind, Vec<CrossReferenceRecord>>;

/// Everything one validator run reported.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidatorReport {
    /// Per-feature verdicts in validator order.
    pub features: Vec<FeatureValidation>,
    /// Cross-reference records (empty for text-mode runs).
    pub cross_references: CrossReferenceData,
}

impl ValidatorReport {
    /// Returns true when nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.cross_references.values().all(Vec::is_empty)
    }
}

// ============================================================================
// SECTION: Adapter Interface
// ============================================================================

/// Failures surfaced while obtaining validator output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// Building the validator failed.
    #[error("validator build failed: {0}")]
    Build(String),
    /// The validator could not be started.
    #[error("validator spawn failed: {0}")]
    Spawn(String),
    /// The validator exited with an unexpected status.
    #[error("validator exited with {code}: stdout: {stdout} stderr: {stderr}")]
    Invocation {
        /// Exit code, or `signal` when terminated without one.
        code: String,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// Filesystem inspection failed.
    #[error("validator io error: {0}")]
    Io(String),
}

/// Provider of validator results.
pub trait ValidatorSource {
    /// Returns the full validation report.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError`] when the validator cannot be built or run.
    fn full_report(&mut self) -> Result<ValidatorReport, ValidatorError>;

    /// Returns breaking-change and behavior-difference records.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError`] when the validator cannot be built or run.
    fn cross_reference_data(&mut self) -> Result<CrossReferenceData, ValidatorError>;
}

/// A fixed report, used when results were produced ahead of time.
impl ValidatorSource for ValidatorReport {
    fn full_report(&mut self) -> Result<ValidatorReport, ValidatorError> {
        Ok(self.clone())
    }

    fn cross_reference_data(&mut self) -> Result<CrossReferenceData, ValidatorError> {
        Ok(self.cross_references.clone())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unflagged_scenarios_take_the_default() {
        let validation = LanguageValidation {
            language: Language::new("python"),
            implemented: true,
            source_path: None,
            failed_scenarios: BTreeSet::from(["b".to_string()]),
            default_status: ScenarioStatus::Pass,
        };
        assert_eq!(validation.status_of("a"), ScenarioStatus::Pass);
        assert_eq!(validation.status_of("b"), ScenarioStatus::Fail);
    }

    #[test]
    fn anchors_are_kind_prefixed_and_sanitized() {
        let record = CrossReferenceRecord {
            kind: CrossReferenceKind::BehaviorDifference,
            id: "BD#1".to_string(),
            description: String::new(),
            implementations: BTreeMap::new(),
        };
        assert_eq!(record.anchor(), "bd-bd-1");
    }
}
