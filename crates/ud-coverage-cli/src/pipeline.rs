// crates/ud-coverage-cli/src/pipeline.rs
// ============================================================================
// Module: Report Pipeline
// Description: Runs catalog discovery, validation, matrix build, and render.
// Purpose: Produce one rendered report for a workspace and configuration.
// Dependencies: tracing, ud-coverage-config, ud-coverage-core,
//               ud-coverage-render, ud-coverage-validator
// ============================================================================

//! ## Overview
//! [`generate`] wires the configured [`ValidatorBridge`] into
//! [`generate_with`], which accepts any [`ValidatorSource`] so precomputed
//! validator output can be rendered without spawning a process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use tracing::debug;
use ud_coverage_config::CoverageConfig;
use ud_coverage_core::CoverageMatrix;
use ud_coverage_core::FeatureCatalog;
use ud_coverage_core::MatrixBuilder;
use ud_coverage_core::MatrixError;
use ud_coverage_core::ValidatorSource;
use ud_coverage_render::ReportFormat;
use ud_coverage_validator::ValidatorBridge;
use ud_coverage_validator::ValidatorMode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Inputs for one report run.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    /// Absolute workspace root.
    pub workspace: &'a Path,
    /// Validated configuration.
    pub config: &'a CoverageConfig,
    /// Output format.
    pub format: ReportFormat,
    /// Validator dialect for the full report.
    pub mode: ValidatorMode,
}

/// A rendered report with the matrix it came from.
#[derive(Debug, Clone)]
pub struct CoverageReport {
    /// Rendered document.
    pub rendered: String,
    /// Matrix the document was rendered from.
    pub matrix: CoverageMatrix,
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Generates a report using the validator described by the configuration.
///
/// # Errors
///
/// Returns [`MatrixError`] when the validator cannot be built or run.
pub fn generate(request: &ReportRequest<'_>) -> Result<CoverageReport, MatrixError> {
    let mut bridge_config = request.config.bridge_config(request.workspace);
    bridge_config.mode = request.mode;
    let mut bridge = ValidatorBridge::new(bridge_config);
    generate_with(request, &mut bridge)
}

/// Generates a report using verdicts from `source`.
///
/// # Errors
///
/// Returns [`MatrixError`] when `source` fails or the matcher cannot be built.
pub fn generate_with(
    request: &ReportRequest<'_>,
    source: &mut dyn ValidatorSource,
) -> Result<CoverageReport, MatrixError> {
    let policy = request.config.language_policy();
    let mut catalog = FeatureCatalog::new(request.workspace, policy.clone());
    let features = catalog.load(&request.config.catalog.features_dir);
    debug!(features = features.len(), format = %request.format, "catalog loaded");

    let matrix = MatrixBuilder::new(policy)?.build(&mut catalog, features, source)?;
    let rendered = request.format.render(&matrix, &request.config.render_options());
    Ok(CoverageReport { rendered, matrix })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
