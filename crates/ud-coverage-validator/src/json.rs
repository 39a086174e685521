// crates/ud-coverage-validator/src/json.rs
// ============================================================================
// Module: JSON Report Adapter
// Description: Parser for the validator's `--json` document.
// Purpose: Turn explicit per-scenario validator results into a report.
// Dependencies: serde, serde_json, tracing, ud-coverage-core
// ============================================================================

//! ## Overview
//! The JSON document is the preferred contract: it carries per-method
//! missing-step records and per-scenario warnings, so scenario failures are
//! explicit rather than inferred. Cross-reference reports for breaking
//! changes and behavior differences share one raw shape; kind-specific field
//! names are accepted as aliases of generic ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;
use ud_coverage_core::CrossReferenceData;
use ud_coverage_core::CrossReferenceKind;
use ud_coverage_core::CrossReferenceRecord;
use ud_coverage_core::FeatureValidation;
use ud_coverage_core::Implementation;
use ud_coverage_core::LanguageValidation;
use ud_coverage_core::ScenarioStatus;
use ud_coverage_core::SourceLocation;
use ud_coverage_core::ValidatorReport;

use crate::adapter::AdapterContext;
use crate::adapter::AdapterError;
use crate::adapter::ReportAdapter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Warning prefix naming a scenario without a test method.
const MISSING_METHOD_WARNING: &str = "No test method found for scenario: ";
/// Suffix the validator appends when it knows the expected directory.
const EXPECTED_IN_SUFFIX: &str = " (expected in ";

// ============================================================================
// SECTION: Raw Schema
// ============================================================================

/// Top-level validator document.
#[derive(Debug, Deserialize)]
struct RawDocument {
    /// Per-feature validation results.
    #[serde(default)]
    validation_results: Vec<RawValidationResult>,
    /// Breaking change report.
    #[serde(default)]
    breaking_changes_report: Option<RawCrossReport>,
    /// Behavior difference report.
    #[serde(default)]
    behavior_differences_report: Option<RawCrossReport>,
}

/// Validation results for one feature file.
#[derive(Debug, Deserialize)]
struct RawValidationResult {
    /// Feature path as the validator saw it.
    feature_file: String,
    /// Per-language results.
    #[serde(default)]
    validations: Vec<RawLanguageValidation>,
}

/// Validation result for one language.
#[derive(Debug, Deserialize)]
struct RawLanguageValidation {
    /// Language enum name (`Rust`, `Odbc`, ...).
    language: String,
    /// Whether a test file was located.
    #[serde(default)]
    test_file_found: bool,
    /// Located test file.
    #[serde(default)]
    test_file_path: Option<String>,
    /// Steps with no implementation.
    #[serde(default)]
    missing_steps: Vec<String>,
    /// Steps with an implementation.
    #[serde(default)]
    implemented_steps: Vec<String>,
    /// Free-form warnings, some naming scenarios.
    #[serde(default)]
    warnings: Vec<String>,
    /// Missing steps grouped by test method.
    #[serde(default)]
    missing_steps_by_method: Vec<RawMethodValidation>,
}

/// Missing steps of one test method.
#[derive(Debug, Deserialize)]
struct RawMethodValidation {
    /// Scenario the method implements.
    scenario_name: String,
}

/// Cross-reference report of one kind.
#[derive(Debug, Default, Deserialize)]
struct RawCrossReport {
    /// Record id to description.
    #[serde(
        default,
        alias = "breaking_change_descriptions",
        alias = "behavior_difference_descriptions"
    )]
    descriptions: BTreeMap<String, String>,
    /// Lowercase language key to records.
    #[serde(
        default,
        alias = "breaking_changes_by_language",
        alias = "behavior_differences_by_language"
    )]
    by_language: BTreeMap<String, Vec<RawRecord>>,
}

/// One record as listed under a language.
#[derive(Debug, Deserialize)]
struct RawRecord {
    /// Record identifier.
    #[serde(alias = "breaking_change_id", alias = "behavior_difference_id")]
    id: String,
    /// Description, possibly empty.
    #[serde(default)]
    description: String,
    /// Tests asserting the record.
    #[serde(default)]
    implementations: Vec<RawImplementation>,
}

/// One test asserting a record.
#[derive(Debug, Deserialize)]
struct RawImplementation {
    /// Test method name.
    test_method: String,
    /// Test file.
    test_file: String,
    /// 1-based line.
    #[serde(default)]
    test_line: Option<usize>,
    /// File asserting the new behavior.
    #[serde(default, alias = "new_behavior_file")]
    new_behaviour_file: Option<String>,
    /// Line asserting the new behavior.
    #[serde(default, alias = "new_behavior_line")]
    new_behaviour_line: Option<usize>,
    /// File asserting the old behavior.
    #[serde(default, alias = "old_behavior_file")]
    old_behaviour_file: Option<String>,
    /// Line asserting the old behavior.
    #[serde(default, alias = "old_behavior_line")]
    old_behaviour_line: Option<usize>,
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for the JSON dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

impl ReportAdapter for JsonAdapter {
    fn parse(
        &self,
        output: &str,
        context: &AdapterContext,
    ) -> Result<ValidatorReport, AdapterError> {
        let document: RawDocument =
            serde_json::from_str(output).map_err(|err| AdapterError::Json(err.to_string()))?;

        let features = document
            .validation_results
            .into_iter()
            .map(|result| convert_feature(result, context))
            .collect();

        let mut cross_references = CrossReferenceData::new();
        for (kind, report) in [
            (CrossReferenceKind::BreakingChange, document.breaking_changes_report),
            (CrossReferenceKind::BehaviorDifference, document.behavior_differences_report),
        ] {
            let records = report.map(|raw| convert_records(kind, raw, context)).unwrap_or_default();
            debug!(kind = kind.label(), records = records.len(), "cross references parsed");
            cross_references.insert(kind, records);
        }

        Ok(ValidatorReport {
            features,
            cross_references,
        })
    }
}

// ============================================================================
// SECTION: Conversion
// ============================================================================

/// Converts one feature's raw results.
fn convert_feature(raw: RawValidationResult, context: &AdapterContext) -> FeatureValidation {
    let mut languages = BTreeMap::new();
    for validation in raw.validations {
        let converted = convert_language(validation, context);
        languages.entry(converted.language.clone()).or_insert(converted);
    }
    FeatureValidation {
        feature_path: context.relativize(&raw.feature_file),
        languages,
    }
}

/// Converts one language result, deriving flagged scenarios explicitly.
fn convert_language(raw: RawLanguageValidation, context: &AdapterContext) -> LanguageValidation {
    let mut failed: BTreeSet<String> =
        raw.missing_steps_by_method.into_iter().map(|method| method.scenario_name).collect();
    failed.extend(raw.warnings.iter().filter_map(|warning| missing_method_scenario(warning)));

    let implemented = raw.test_file_found
        && raw.missing_steps.is_empty()
        && !raw.implemented_steps.is_empty()
        && failed.is_empty();
    let source_path = if raw.test_file_found {
        raw.test_file_path.as_deref().map(|path| context.relativize(path))
    } else {
        None
    };
    let default_status =
        if raw.test_file_found { ScenarioStatus::Pass } else { ScenarioStatus::Fail };

    LanguageValidation {
        language: context.policy.resolve(&raw.language),
        implemented,
        source_path,
        failed_scenarios: failed,
        default_status,
    }
}

/// Extracts the scenario named by a "no test method" warning.
pub(crate) fn missing_method_scenario(warning: &str) -> Option<String> {
    let rest = warning.trim().strip_prefix(MISSING_METHOD_WARNING)?;
    let name = rest.split_once(EXPECTED_IN_SUFFIX).map_or(rest, |(name, _)| name).trim();
    if name.is_empty() { None } else { Some(name.to_string()) }
}

/// Merges per-language raw records into one record per id, sorted by id.
fn convert_records(
    kind: CrossReferenceKind,
    raw: RawCrossReport,
    context: &AdapterContext,
) -> Vec<CrossReferenceRecord> {
    let mut records: BTreeMap<String, CrossReferenceRecord> = BTreeMap::new();
    for (language, entries) in raw.by_language {
        let language = context.policy.resolve(&language);
        for entry in entries {
            let record = records.entry(entry.id.clone()).or_insert_with(|| CrossReferenceRecord {
                kind,
                id: entry.id.clone(),
                description: String::new(),
                implementations: BTreeMap::new(),
            });
            if record.description.is_empty() {
                record.description.clone_from(&entry.description);
            }
            let implementations = record.implementations.entry(language.clone()).or_default();
            implementations.extend(entry.implementations.into_iter().map(|raw| Implementation {
                test_method: raw.test_method,
                test_file: context.relativize(&raw.test_file),
                test_line: raw.test_line,
                old_behavior: location(raw.old_behaviour_file, raw.old_behaviour_line, context),
                new_behavior: location(raw.new_behaviour_file, raw.new_behaviour_line, context),
            }));
            implementations.sort();
            implementations.dedup();
        }
    }
    for (id, description) in raw.descriptions {
        if let Some(record) = records.get_mut(&id)
            && record.description.is_empty()
        {
            record.description = description;
        }
    }
    records.into_values().collect()
}

/// Pairs an optional file and line into a location.
fn location(
    file: Option<String>,
    line: Option<usize>,
    context: &AdapterContext,
) -> Option<SourceLocation> {
    file.zip(line).map(|(file, line)| SourceLocation {
        file: context.relativize(&file),
        line,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
