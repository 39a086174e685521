// crates/ud-coverage-validator/src/bridge.rs
// ============================================================================
// Module: Validator Bridge
// Description: Memoizing front end over the external validator process.
// Purpose: Provide full reports and cross-reference data with one run per mode.
// Dependencies: serde, tracing, ud-coverage-core
// ============================================================================

//! ## Overview
//! [`ValidatorBridge`] resolves paths from a [`BridgeConfig`], rebuilds the
//! validator when [`crate::needs_rebuild`] says so, runs it in the requested
//! [`ValidatorMode`], and hands the output to the matching adapter. Reports
//! are memoized per mode on the bridge itself.
//!
//! Cross-reference data always comes from the JSON dialect, since the text
//! log does not carry it. In text mode the prebuilt binary may be absent, so
//! a failed JSON run there degrades to empty cross-reference data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;
use tracing::warn;
use ud_coverage_core::CrossReferenceData;
use ud_coverage_core::LanguagePolicy;
use ud_coverage_core::ValidatorError;
use ud_coverage_core::ValidatorReport;
use ud_coverage_core::ValidatorSource;

use crate::adapter::AdapterContext;
use crate::adapter::ReportAdapter;
use crate::freshness::needs_rebuild;
use crate::json::JsonAdapter;
use crate::process;
use crate::process::CommandOutput;
use crate::text::TextAdapter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exit codes treated as a completed validation (1 means findings).
const ACCEPTED_EXIT_CODES: [i32; 2] = [0, 1];

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Validator output dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorMode {
    /// Prebuilt binary with `--json`.
    #[default]
    Json,
    /// `<build-tool> run` with `--verbose` text output.
    Text,
}

impl ValidatorMode {
    /// Returns the adapter for this dialect.
    fn adapter(self) -> &'static dyn ReportAdapter {
        match self {
            Self::Json => &JsonAdapter,
            Self::Text => &TextAdapter,
        }
    }
}

impl fmt::Display for ValidatorMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Json => "json",
            Self::Text => "text",
        })
    }
}

/// Paths and tools used to reach the validator.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Workspace root passed to the validator.
    pub workspace: PathBuf,
    /// Specifications directory (relative to the workspace unless absolute).
    pub features_dir: PathBuf,
    /// Validator crate directory (relative to the workspace unless absolute).
    pub validator_dir: PathBuf,
    /// Validator binary (relative to the validator directory unless absolute).
    pub binary: PathBuf,
    /// Build tool program (`cargo`).
    pub build_tool: String,
    /// Binary name passed to `<build-tool> run --bin`.
    pub bin_name: String,
    /// Whether stale binaries are rebuilt before use.
    pub rebuild: bool,
    /// Dialect used for the full report.
    pub mode: ValidatorMode,
    /// Language alias rules applied to reported names.
    pub policy: LanguagePolicy,
}

// ============================================================================
// SECTION: Bridge
// ============================================================================

/// Memoizing validator front end.
///
/// # Invariants
/// - `reports` holds at most one report per mode.
/// - `checked` is true once the rebuild policy ran for the current cache.
#[derive(Debug)]
pub struct ValidatorBridge {
    /// Resolved configuration.
    config: BridgeConfig,
    /// Adapter inputs derived from the configuration.
    context: AdapterContext,
    /// Memoized reports per mode.
    reports: BTreeMap<ValidatorMode, ValidatorReport>,
    /// Whether the rebuild policy already ran.
    checked: bool,
}

impl ValidatorBridge {
    /// Creates a bridge, resolving the workspace to an absolute path.
    #[must_use]
    pub fn new(mut config: BridgeConfig) -> Self {
        if let Ok(absolute) = std::path::absolute(&config.workspace) {
            config.workspace = absolute;
        }
        let context = AdapterContext {
            workspace: config.workspace.clone(),
            policy: config.policy.clone(),
        };
        Self {
            config,
            context,
            reports: BTreeMap::new(),
            checked: false,
        }
    }

    /// Returns the report for `mode`, running the validator on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError`] when the validator cannot be built or run.
    pub fn report(&mut self, mode: ValidatorMode) -> Result<ValidatorReport, ValidatorError> {
        if let Some(report) = self.reports.get(&mode) {
            return Ok(report.clone());
        }
        self.ensure_fresh()?;
        let output = self.invoke(mode)?;
        let report = match mode.adapter().parse(&output.stdout, &self.context) {
            Ok(report) => report,
            Err(err) => {
                warn!(mode = %mode, error = %err, "validator output unusable; using empty report");
                ValidatorReport::default()
            }
        };
        info!(mode = %mode, features = report.features.len(), "validator report loaded");
        self.reports.insert(mode, report.clone());
        Ok(report)
    }

    /// Returns the report in the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError`] when the validator cannot be built or run.
    pub fn get_full_report(&mut self) -> Result<ValidatorReport, ValidatorError> {
        self.report(self.config.mode)
    }

    /// Returns breaking-change and behavior-difference records.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError`] when the validator cannot be built or run in
    /// JSON mode. In text mode failures yield empty data instead.
    pub fn get_cross_reference_data(&mut self) -> Result<CrossReferenceData, ValidatorError> {
        match self.report(ValidatorMode::Json) {
            Ok(report) => Ok(report.cross_references),
            Err(err) if self.config.mode == ValidatorMode::Text => {
                warn!(error = %err, "cross-reference data unavailable; rendering without it");
                Ok(CrossReferenceData::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Drops memoized reports; the next request re-checks and re-runs.
    pub fn invalidate(&mut self) {
        self.reports.clear();
        self.checked = false;
    }

    /// Returns true when a report for `mode` is memoized.
    #[must_use]
    pub fn is_cached(&self, mode: ValidatorMode) -> bool {
        self.reports.contains_key(&mode)
    }

    /// Rebuilds the validator when stale, at most once per cache lifetime.
    fn ensure_fresh(&mut self) -> Result<(), ValidatorError> {
        if self.checked || !self.config.rebuild {
            return Ok(());
        }
        let dir = self.validator_dir();
        let binary = self.binary_path();
        if needs_rebuild(&dir, &binary)? {
            info!(dir = %dir.display(), "validator binary stale; rebuilding");
            let output = process::run(Path::new(&self.config.build_tool), ["build"], &dir)?;
            if !output.exited_with(&[0]) {
                return Err(ValidatorError::Build(output.stderr));
            }
            self.reports.clear();
        }
        self.checked = true;
        Ok(())
    }

    /// Runs the validator in `mode` and checks its exit code.
    fn invoke(&self, mode: ValidatorMode) -> Result<CommandOutput, ValidatorError> {
        let dir = self.validator_dir();
        let workspace = self.config.workspace.as_os_str().to_os_string();
        let features = self.features_path().into_os_string();
        let output = match mode {
            ValidatorMode::Json => process::run(
                &self.binary_path(),
                [
                    "--workspace".into(),
                    workspace,
                    "--features".into(),
                    features,
                    "--json".into(),
                ],
                &dir,
            )?,
            ValidatorMode::Text => process::run(
                Path::new(&self.config.build_tool),
                [
                    "run".into(),
                    "--bin".into(),
                    self.config.bin_name.clone().into(),
                    "--".into(),
                    "--workspace".into(),
                    workspace,
                    "--features".into(),
                    features,
                    "--verbose".into(),
                ],
                &dir,
            )?,
        };
        if !output.exited_with(&ACCEPTED_EXIT_CODES) {
            return Err(ValidatorError::Invocation {
                code: output.code_label(),
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    /// Absolute validator directory.
    fn validator_dir(&self) -> PathBuf {
        self.config.workspace.join(&self.config.validator_dir)
    }

    /// Absolute validator binary path.
    fn binary_path(&self) -> PathBuf {
        self.validator_dir().join(&self.config.binary)
    }

    /// Absolute specifications directory.
    fn features_path(&self) -> PathBuf {
        self.config.workspace.join(&self.config.features_dir)
    }
}

impl ValidatorSource for ValidatorBridge {
    fn full_report(&mut self) -> Result<ValidatorReport, ValidatorError> {
        self.get_full_report()
    }

    fn cross_reference_data(&mut self) -> Result<CrossReferenceData, ValidatorError> {
        self.get_cross_reference_data()
    }
}
