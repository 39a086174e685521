// crates/ud-coverage-core/src/matrix.rs
// ============================================================================
// Module: Coverage Matrix
// Description: Feature x Language x Scenario matrix and its aggregates.
// Purpose: Join catalog features with validator verdicts for rendering.
// Dependencies: serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`MatrixBuilder::build`] takes the parsed features and a
//! [`ValidatorSource`], and produces an immutable [`CoverageMatrix`]. The
//! matrix is the only input of the renderers.
//!
//! ## Invariants
//! - Every feature has an entry for every language on the axis.
//! - A scenario status exists only where the language has a result.
//! - Coverage percentages are within `[0, 100]` and reach 100 only when every
//!   shared feature with at least one scenario is implemented for the language
//!   with nothing flagged. Features without scenarios weigh nothing.
//! - Language-only features (`definitions/<lang>/`) never enter the coverage
//!   aggregates or the missing-implementation list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::info;

use crate::catalog::FeatureCatalog;
use crate::feature::Feature;
use crate::feature::FeatureScope;
use crate::language::Language;
use crate::language::LanguagePolicy;
use crate::matcher;
use crate::matcher::MatcherError;
use crate::matcher::ScenarioMatcher;
use crate::report::CrossReferenceData;
use crate::report::CrossReferenceKind;
use crate::report::FeatureValidation;
use crate::report::ScenarioStatus;
use crate::report::ValidatorError;
use crate::report::ValidatorSource;
use crate::report::anchor_for;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lower bound (inclusive) of the `high` coverage class.
const HIGH_COVERAGE: f64 = 80.0;
/// Lower bound (inclusive) of the `medium` coverage class.
const MEDIUM_COVERAGE: f64 = 60.0;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Matrix construction failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// The scenario matcher could not be built.
    #[error("matcher error: {0}")]
    Matcher(String),
    /// Validator output could not be obtained.
    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

impl From<MatcherError> for MatrixError {
    fn from(err: MatcherError) -> Self {
        Self::Matcher(err.to_string())
    }
}

// ============================================================================
// SECTION: Matrix Types
// ============================================================================

/// Result of one language for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageResult {
    /// Canonical language key.
    pub language: Language,
    /// Implemented with no scenario flagged.
    pub implemented: bool,
    /// Workspace-relative test file, when located.
    pub source_path: Option<String>,
    /// Status per scenario name, for every scenario of the feature.
    pub scenario_status: BTreeMap<String, ScenarioStatus>,
    /// 1-based declaration line per scenario, where one was found.
    pub source_lines: BTreeMap<String, usize>,
}

/// Entry of a feature for one language on the axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FeatureLanguage {
    /// The validator reported nothing for this language.
    NotPresent,
    /// The validator reported a result.
    Present(LanguageResult),
}

impl FeatureLanguage {
    /// Returns the result when present.
    #[must_use]
    pub const fn result(&self) -> Option<&LanguageResult> {
        match self {
            Self::NotPresent => None,
            Self::Present(result) => Some(result),
        }
    }
}

/// Link from a scenario to a cross-reference record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CrossReferenceLink {
    /// Record kind.
    pub kind: CrossReferenceKind,
    /// Record id.
    pub id: String,
    /// HTML anchor of the record block.
    pub anchor: String,
}

/// One feature with its per-language results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCoverage {
    /// Parsed feature.
    pub feature: Feature,
    /// Entry for every language on the axis.
    pub languages: BTreeMap<Language, FeatureLanguage>,
    /// Scenario name to per-language cross-reference links (sorted, unique).
    pub cross_references: BTreeMap<String, BTreeMap<Language, Vec<CrossReferenceLink>>>,
}

impl FeatureCoverage {
    /// Returns the result of `language`, if present.
    #[must_use]
    pub fn result(&self, language: &Language) -> Option<&LanguageResult> {
        self.languages.get(language).and_then(FeatureLanguage::result)
    }

    /// Returns the status of `scenario` for `language`, if defined.
    #[must_use]
    pub fn status(&self, language: &Language, scenario: &str) -> Option<ScenarioStatus> {
        self.result(language).and_then(|result| result.scenario_status.get(scenario).copied())
    }

    /// Returns cross-reference links of `scenario` for `language`.
    #[must_use]
    pub fn links(&self, scenario: &str, language: &Language) -> &[CrossReferenceLink] {
        self.cross_references
            .get(scenario)
            .and_then(|by_language| by_language.get(language))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Coverage summary class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoverageClass {
    /// At least 80 percent.
    High,
    /// At least 60 percent.
    Medium,
    /// Below 60 percent.
    Low,
    /// No scenarios to measure.
    NotApplicable,
}

impl CoverageClass {
    /// Returns the class for a percentage over `total` scenarios.
    #[must_use]
    pub fn classify(total: usize, percentage: f64) -> Self {
        if total == 0 {
            Self::NotApplicable
        } else if percentage >= HIGH_COVERAGE {
            Self::High
        } else if percentage >= MEDIUM_COVERAGE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// CSS class name used by the HTML summary cards.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::NotApplicable => "na",
        }
    }
}

/// Per-language coverage aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageCoverage {
    /// Canonical language key.
    pub language: Language,
    /// Scenarios of shared features implemented for the language.
    pub implemented_scenarios: usize,
    /// Scenarios across all shared features.
    pub total_scenarios: usize,
    /// `implemented / total * 100`, clamped; 0 when there are no scenarios.
    pub percentage: f64,
    /// Summary class.
    pub class: CoverageClass,
}

impl LanguageCoverage {
    /// Computes the aggregate for the given counts.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "Scenario counts stay far below 2^52.")]
    pub fn new(language: Language, implemented_scenarios: usize, total_scenarios: usize) -> Self {
        let percentage = if total_scenarios == 0 {
            0.0
        } else {
            (implemented_scenarios as f64 / total_scenarios as f64 * 100.0).clamp(0.0, 100.0)
        };
        Self {
            language,
            implemented_scenarios,
            total_scenarios,
            percentage,
            class: CoverageClass::classify(total_scenarios, percentage),
        }
    }
}

/// A (feature, language) pair with no implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingImplementation {
    /// Workspace-relative feature path.
    pub feature_path: String,
    /// Feature title.
    pub feature_title: String,
    /// Language lacking the implementation.
    pub language: Language,
}

/// The fully joined coverage matrix.
///
/// # Invariants
/// - `features` is sorted by (folder, path).
/// - `languages` follows the language policy order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageMatrix {
    /// Language axis.
    pub languages: Vec<Language>,
    /// Features with their per-language entries.
    pub features: Vec<FeatureCoverage>,
    /// Aggregates in axis order.
    pub coverage: Vec<LanguageCoverage>,
    /// Pairs lacking an implementation.
    pub missing: Vec<MissingImplementation>,
    /// Cross-reference records per kind, sorted by id.
    pub cross_references: CrossReferenceData,
}

impl CoverageMatrix {
    /// Returns true when there is nothing to render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() || self.languages.is_empty()
    }

    /// Returns the features every driver is expected to implement.
    pub fn shared_features(&self) -> impl Iterator<Item = &FeatureCoverage> {
        self.features.iter().filter(|coverage| coverage.feature.scope.is_shared())
    }

    /// Groups language-only features by owning language, in path order.
    #[must_use]
    pub fn language_only_features(&self) -> BTreeMap<&Language, Vec<&FeatureCoverage>> {
        let mut grouped: BTreeMap<&Language, Vec<&FeatureCoverage>> = BTreeMap::new();
        for coverage in &self.features {
            if let FeatureScope::LanguageOnly(language) = &coverage.feature.scope {
                grouped.entry(language).or_default().push(coverage);
            }
        }
        for features in grouped.values_mut() {
            features.sort_by(|a, b| a.feature.path.cmp(&b.feature.path));
        }
        grouped
    }

    /// Groups features by folder, folders sorted by name.
    #[must_use]
    pub fn folders(&self) -> Vec<(&str, Vec<&FeatureCoverage>)> {
        let mut grouped: BTreeMap<&str, Vec<&FeatureCoverage>> = BTreeMap::new();
        for coverage in &self.features {
            grouped.entry(coverage.feature.folder.as_str()).or_default().push(coverage);
        }
        grouped.into_iter().collect()
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Joins features with validator output.
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    /// Ordering of the language axis.
    policy: LanguagePolicy,
    /// Declaration scanner for deep links.
    matcher: ScenarioMatcher,
}

impl MatrixBuilder {
    /// Creates a builder ordering languages with `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Matcher`] when the matcher cannot be compiled.
    pub fn new(policy: LanguagePolicy) -> Result<Self, MatrixError> {
        Ok(Self {
            policy,
            matcher: ScenarioMatcher::new()?,
        })
    }

    /// Builds the matrix for `features` using verdicts from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Validator`] when validator output is unavailable.
    pub fn build(
        &self,
        catalog: &mut FeatureCatalog,
        mut features: Vec<Feature>,
        source: &mut dyn ValidatorSource,
    ) -> Result<CoverageMatrix, MatrixError> {
        let report = source.full_report()?;
        let mut cross_references = source.cross_reference_data()?;
        for records in cross_references.values_mut() {
            records.sort_by(|a, b| a.id.cmp(&b.id));
        }

        features.sort_by(|a, b| (&a.folder, &a.path).cmp(&(&b.folder, &b.path)));
        let index = ValidationIndex::new(&report.features);
        let joined: BTreeSet<&str> = features
            .iter()
            .filter_map(|feature| index.lookup(feature))
            .map(|validation| validation.feature_path.as_str())
            .collect();
        for validation in &report.features {
            if !joined.contains(validation.feature_path.as_str()) {
                debug!(feature = %validation.feature_path, "validator feature not in catalog");
            }
        }

        let languages = self.policy.order(
            features
                .iter()
                .filter_map(|feature| index.lookup(feature))
                .flat_map(|validation| validation.languages.keys().cloned()),
        );

        let mut rows = Vec::with_capacity(features.len());
        for feature in features {
            let validation = index.lookup(&feature);
            let names = feature.scenario_names();
            let mut entries = BTreeMap::new();
            for language in &languages {
                let entry = match validation.and_then(|v| v.languages.get(language)) {
                    None => FeatureLanguage::NotPresent,
                    Some(verdict) => {
                        let scenario_status: BTreeMap<String, ScenarioStatus> = names
                            .iter()
                            .map(|name| ((*name).to_string(), verdict.status_of(name)))
                            .collect();
                        let clean =
                            scenario_status.values().all(|status| *status == ScenarioStatus::Pass);
                        let source_lines = verdict.source_path.as_deref().map_or_else(
                            BTreeMap::new,
                            |path| self.matcher.extract_methods(catalog, Path::new(path), &names),
                        );
                        FeatureLanguage::Present(LanguageResult {
                            language: language.clone(),
                            implemented: verdict.implemented && clean,
                            source_path: verdict.source_path.clone(),
                            scenario_status,
                            source_lines,
                        })
                    }
                };
                entries.insert(language.clone(), entry);
            }
            let links = cross_reference_links(&feature, &languages, &cross_references);
            rows.push(FeatureCoverage {
                feature,
                languages: entries,
                cross_references: links,
            });
        }

        let coverage = languages.iter().map(|language| aggregate(language, &rows)).collect();
        let missing = missing_implementations(&languages, &rows);
        info!(
            features = rows.len(),
            languages = languages.len(),
            missing = missing.len(),
            "coverage matrix built"
        );
        Ok(CoverageMatrix {
            languages,
            features: rows,
            coverage,
            missing,
            cross_references,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Lookup of validator verdicts by feature path and by file stem.
struct ValidationIndex<'a> {
    /// Verdicts keyed by normalized path.
    by_path: BTreeMap<String, &'a FeatureValidation>,
    /// Verdicts keyed by file stem.
    by_stem: BTreeMap<String, &'a FeatureValidation>,
}

impl<'a> ValidationIndex<'a> {
    /// Indexes verdicts; the first verdict for a key wins.
    fn new(validations: &'a [FeatureValidation]) -> Self {
        let mut by_path = BTreeMap::new();
        let mut by_stem = BTreeMap::new();
        for validation in validations {
            let path = normalize_path(&validation.feature_path);
            by_stem.entry(stem_of(&path).to_string()).or_insert(validation);
            by_path.entry(path).or_insert(validation);
        }
        Self {
            by_path,
            by_stem,
        }
    }

    /// Finds the verdict of `feature`, by path first and by stem second.
    fn lookup(&self, feature: &Feature) -> Option<&'a FeatureValidation> {
        self.by_path
            .get(&normalize_path(&feature.path))
            .or_else(|| self.by_stem.get(feature.stem()))
            .copied()
    }
}

/// Normalizes separators and strips a leading `./`.
fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    slashed.trim_start_matches("./").to_string()
}

/// File stem of a `/`-separated path.
fn stem_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// Collects cross-reference links for every scenario and language.
fn cross_reference_links(
    feature: &Feature,
    languages: &[Language],
    data: &CrossReferenceData,
) -> BTreeMap<String, BTreeMap<Language, Vec<CrossReferenceLink>>> {
    let mut out = BTreeMap::new();
    for scenario in &feature.scenarios {
        let mut per_language = BTreeMap::new();
        for language in languages {
            let links: BTreeSet<CrossReferenceLink> = data
                .values()
                .flatten()
                .filter(|record| {
                    record.implementations.get(language).is_some_and(|impls| {
                        impls.iter().any(|i| matcher::matches(&i.test_method, &scenario.name))
                    })
                })
                .map(|record| CrossReferenceLink {
                    kind: record.kind,
                    id: record.id.clone(),
                    anchor: anchor_for(record.kind, &record.id),
                })
                .collect();
            if !links.is_empty() {
                per_language.insert(language.clone(), links.into_iter().collect());
            }
        }
        if !per_language.is_empty() {
            out.insert(scenario.name.clone(), per_language);
        }
    }
    out
}

/// Computes the coverage aggregate of `language` over shared features.
///
/// Each feature weighs its scenario count, so a feature with no scenarios
/// moves neither the numerator nor the denominator.
fn aggregate(language: &Language, rows: &[FeatureCoverage]) -> LanguageCoverage {
    let mut implemented = 0;
    let mut total = 0;
    for row in rows.iter().filter(|row| row.feature.scope.is_shared()) {
        let count = row.feature.scenarios.len();
        total += count;
        if row.result(language).is_some_and(|result| result.implemented) {
            implemented += count;
        }
    }
    LanguageCoverage::new(language.clone(), implemented, total)
}

/// Lists unimplemented shared pairs, skipping languages excluded from every scenario.
fn missing_implementations(
    languages: &[Language],
    rows: &[FeatureCoverage],
) -> Vec<MissingImplementation> {
    let mut missing = Vec::new();
    for row in rows.iter().filter(|row| row.feature.scope.is_shared()) {
        for language in languages {
            if row.result(language).is_some_and(|result| result.implemented) {
                continue;
            }
            let scenarios = &row.feature.scenarios;
            if !scenarios.is_empty() && scenarios.iter().all(|s| s.is_excluded_for(language)) {
                continue;
            }
            missing.push(MissingImplementation {
                feature_path: row.feature.path.clone(),
                feature_title: row.feature.title.clone(),
                language: language.clone(),
            });
        }
    }
    missing
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_totals_are_zero_and_not_applicable() {
        let coverage = LanguageCoverage::new(Language::new("odbc"), 0, 0);
        assert!(coverage.percentage.abs() < f64::EPSILON);
        assert_eq!(coverage.class, CoverageClass::NotApplicable);
    }

    #[test]
    fn classes_follow_thresholds() {
        assert_eq!(LanguageCoverage::new(Language::new("a"), 8, 10).class, CoverageClass::High);
        assert_eq!(LanguageCoverage::new(Language::new("a"), 6, 10).class, CoverageClass::Medium);
        assert_eq!(LanguageCoverage::new(Language::new("a"), 5, 10).class, CoverageClass::Low);
    }

    fn row(path: &str, text: &str, implemented: bool) -> FeatureCoverage {
        let policy = LanguagePolicy::default();
        let feature = crate::feature::parse_feature(path, "auth", text, &policy);
        let language = Language::new("python");
        let result = LanguageResult {
            language: language.clone(),
            implemented,
            source_path: None,
            scenario_status: BTreeMap::new(),
            source_lines: BTreeMap::new(),
        };
        FeatureCoverage {
            feature,
            languages: BTreeMap::from([(language, FeatureLanguage::Present(result))]),
            cross_references: BTreeMap::new(),
        }
    }

    #[test]
    fn features_without_scenarios_weigh_nothing() {
        let rows = vec![
            row("tests/definitions/auth/a.feature", "Feature: A\n  Scenario: One\n", true),
            row("tests/definitions/auth/b.feature", "Feature: B\n", false),
        ];
        let coverage = aggregate(&Language::new("python"), &rows);
        assert_eq!(coverage.implemented_scenarios, 1);
        assert_eq!(coverage.total_scenarios, 1);
        assert_eq!(coverage.class, CoverageClass::High);
        let missing = missing_implementations(&[Language::new("python")], &rows);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].feature_title, "B");
    }

    #[test]
    fn validator_paths_are_normalized() {
        let windows = "./tests\\definitions\\a.feature";
        assert_eq!(normalize_path(windows), "tests/definitions/a.feature");
        assert_eq!(stem_of("tests/definitions/a.feature"), "a");
    }
}
