// crates/ud-coverage-validator/src/text.rs
// ============================================================================
// Module: Text Report Adapter
// Description: Line-oriented parser for the validator's verbose text log.
// Purpose: Recover per-language verdicts when only text output is available.
// Dependencies: ud-coverage-core
// ============================================================================

//! ## Overview
//! The text log is a sequence of feature blocks:
//!
//! ```text
//! 📋 Feature: tests/definitions/query/select.feature
//!   ✅ Python: python/tests/e2e/test_select.py
//!   ❌ Jdbc: jdbc/src/test/SelectTest.java (validation failed)
//!      ⚠️  Missing steps by method:
//!        In method 'selectMany' at line 40 (scenario: Select many):
//!   ❌ Rust: No test file found
//! ```
//!
//! The parser is a small state machine keyed on those markers. Its output is
//! coarser than the JSON dialect: a failed language without any flagged
//! scenario leaves the remaining scenarios passing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use ud_coverage_core::FeatureValidation;
use ud_coverage_core::Language;
use ud_coverage_core::LanguageValidation;
use ud_coverage_core::ScenarioStatus;
use ud_coverage_core::ValidatorReport;

use crate::adapter::AdapterContext;
use crate::adapter::AdapterError;
use crate::adapter::ReportAdapter;
use crate::json::missing_method_scenario;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Feature block marker.
const FEATURE_MARKER: &str = "📋 Feature:";
/// Passing language marker.
const PASS_MARKER: char = '✅';
/// Failing language marker.
const FAIL_MARKER: char = '❌';
/// Header of the per-method missing steps block.
const MISSING_STEPS_HEADER: &str = "⚠️  Missing steps by method:";
/// Warning glyph prefix on free-form warning lines.
const WARNING_GLYPH: &str = "⚠️";
/// Suffix on failing language lines that have a test file.
const VALIDATION_FAILED_SUFFIX: &str = " (validation failed)";
/// Placeholder the validator prints instead of a path.
const NO_TEST_FILE: &str = "No test file found";
/// Prefix of a flagged method line.
const METHOD_PREFIX: &str = "In method ";
/// Scenario clause inside a flagged method line.
const SCENARIO_CLAUSE: &str = " (scenario: ";

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for the text dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAdapter;

/// Parser state while walking the log.
#[derive(Default)]
struct TextState {
    /// Completed feature blocks.
    features: Vec<FeatureValidation>,
    /// Feature block being filled.
    feature: Option<FeatureValidation>,
    /// Language whose lines are being read.
    language: Option<Language>,
    /// Inside a "Missing steps by method" block.
    in_missing_steps: bool,
    /// Count of recognized marker lines.
    markers: usize,
}

impl TextState {
    /// Closes the current feature block.
    fn flush(&mut self) {
        if let Some(feature) = self.feature.take() {
            self.features.push(feature);
        }
        self.language = None;
        self.in_missing_steps = false;
    }

    /// Marks `scenario` failed for the current language.
    fn flag(&mut self, scenario: String) {
        let Some(language) = &self.language else {
            return;
        };
        if let Some(validation) =
            self.feature.as_mut().and_then(|feature| feature.languages.get_mut(language))
        {
            validation.failed_scenarios.insert(scenario);
            validation.implemented = false;
        }
    }
}

impl ReportAdapter for TextAdapter {
    fn parse(
        &self,
        output: &str,
        context: &AdapterContext,
    ) -> Result<ValidatorReport, AdapterError> {
        let mut state = TextState::default();
        let mut line_count = 0;

        for raw in output.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            line_count += 1;

            if let Some(path) = line.strip_prefix(FEATURE_MARKER) {
                state.flush();
                state.markers += 1;
                state.feature = Some(FeatureValidation {
                    feature_path: context.relativize(path),
                    languages: std::collections::BTreeMap::new(),
                });
                continue;
            }

            if let Some(validation) = language_line(line, context) {
                let Some(feature) = state.feature.as_mut() else {
                    continue;
                };
                state.markers += 1;
                state.language = Some(validation.language.clone());
                state.in_missing_steps = false;
                feature.languages.insert(validation.language.clone(), validation);
                continue;
            }

            if line.starts_with(MISSING_STEPS_HEADER) {
                state.in_missing_steps = true;
                continue;
            }

            if let Some(warning) = line.strip_prefix(WARNING_GLYPH) {
                if let Some(scenario) = missing_method_scenario(warning) {
                    state.flag(scenario);
                }
                continue;
            }

            if state.in_missing_steps
                && let Some(scenario) = flagged_scenario(line)
            {
                state.flag(scenario);
            }
        }
        state.flush();

        if state.markers == 0 && line_count > 0 {
            return Err(AdapterError::Text(line_count));
        }
        Ok(ValidatorReport {
            features: state.features,
            cross_references: ud_coverage_core::CrossReferenceData::new(),
        })
    }
}

// ============================================================================
// SECTION: Line Parsers
// ============================================================================

/// Parses `<✅|❌> <Language>: <path>[ (validation failed)]`.
fn language_line(line: &str, context: &AdapterContext) -> Option<LanguageValidation> {
    let mut chars = line.chars();
    let glyph = chars.next()?;
    if glyph != PASS_MARKER && glyph != FAIL_MARKER {
        return None;
    }
    let (name, detail) = chars.as_str().trim_start().split_once(": ")?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    let passed = glyph == PASS_MARKER;
    let detail = detail.trim();
    let path = detail.strip_suffix(VALIDATION_FAILED_SUFFIX).unwrap_or(detail).trim();
    let (source_path, default_status) = if path == NO_TEST_FILE {
        (None, ScenarioStatus::Fail)
    } else {
        (Some(context.relativize(path)), ScenarioStatus::Pass)
    };
    Some(LanguageValidation {
        language: context.policy.resolve(name),
        implemented: passed,
        source_path,
        failed_scenarios: BTreeSet::new(),
        default_status,
    })
}

/// Parses `In method '<m>'[ at line <n>] (scenario: <name>):`.
fn flagged_scenario(line: &str) -> Option<String> {
    let rest = line.strip_prefix(METHOD_PREFIX)?;
    let (_, scenario) = rest.split_once(SCENARIO_CLAUSE)?;
    let scenario = scenario.strip_suffix("):").or_else(|| scenario.strip_suffix(')'))?;
    let scenario = scenario.trim();
    if scenario.is_empty() { None } else { Some(scenario.to_string()) }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
