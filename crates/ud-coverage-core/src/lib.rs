// crates/ud-coverage-core/src/lib.rs
// ============================================================================
// Module: Universal Driver Coverage Core
// Description: Feature catalog, scenario matching, and coverage matrix model.
// Purpose: Correlate Gherkin specifications with per-language test suites.
// Dependencies: regex, serde, thiserror, tracing, walkdir
// ============================================================================

//! ## Overview
//! `ud-coverage-core` holds the pipeline stages that do not talk to the
//! external validator process: the Feature Catalog, the Scenario Matcher, the
//! validator report model with its adapter trait, and the Coverage Matrix
//! Builder. The validator bridge lives in `ud-coverage-validator` and plugs in
//! through [`ValidatorSource`].
//!
//! ## Invariants
//! - Scenario order is declaration order and is preserved end to end.
//! - Every map iterated for presentation is ordered (`BTreeMap`/sorted `Vec`),
//!   so identical inputs produce identical matrices.
//! - Caches are owned by long-lived objects and cleared explicitly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod catalog;
pub mod feature;
pub mod language;
pub mod matcher;
pub mod matrix;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::SourceCache;
pub use catalog::CatalogError;
pub use catalog::FeatureCatalog;
pub use feature::Feature;
pub use feature::FeatureScope;
pub use feature::Scenario;
pub use feature::TestLevel;
pub use feature::parse_feature;
pub use language::CORE_LANGUAGE;
pub use language::Language;
pub use language::LanguagePolicy;
pub use matcher::DeclarationStyle;
pub use matcher::MatcherError;
pub use matcher::ScenarioMatcher;
pub use matcher::TestDeclaration;
pub use matrix::CoverageClass;
pub use matrix::CoverageMatrix;
pub use matrix::CrossReferenceLink;
pub use matrix::FeatureCoverage;
pub use matrix::FeatureLanguage;
pub use matrix::LanguageCoverage;
pub use matrix::LanguageResult;
pub use matrix::MatrixBuilder;
pub use matrix::MatrixError;
pub use matrix::MissingImplementation;
pub use report::CrossReferenceData;
pub use report::CrossReferenceKind;
pub use report::CrossReferenceRecord;
pub use report::FeatureValidation;
pub use report::Implementation;
pub use report::LanguageValidation;
pub use report::ScenarioStatus;
pub use report::SourceLocation;
pub use report::ValidatorError;
pub use report::ValidatorReport;
pub use report::ValidatorSource;
