// crates/ud-coverage-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Temporary workspaces and canned validator reports.
// Purpose: Share setup across ud-coverage-core integration tests.
// ============================================================================

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures.")]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use ud_coverage_core::FeatureValidation;
use ud_coverage_core::Language;
use ud_coverage_core::LanguageValidation;
use ud_coverage_core::ScenarioStatus;

/// Creates an empty temporary workspace.
pub fn workspace() -> Result<TempDir, String> {
    tempfile::tempdir().map_err(|err| err.to_string())
}

/// Writes `contents` to `relative` under `root`, creating parent directories.
pub fn write(root: &Path, relative: &str, contents: &str) -> Result<(), String> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    fs::write(path, contents).map_err(|err| err.to_string())
}

/// Builds a language verdict.
pub fn verdict(
    language: &str,
    implemented: bool,
    source_path: Option<&str>,
    failed: &[&str],
) -> LanguageValidation {
    LanguageValidation {
        language: Language::new(language),
        implemented,
        source_path: source_path.map(str::to_string),
        failed_scenarios: failed.iter().map(|name| (*name).to_string()).collect::<BTreeSet<_>>(),
        default_status: ScenarioStatus::Pass,
    }
}

/// Builds a feature verdict from language verdicts.
pub fn feature_verdict(path: &str, languages: Vec<LanguageValidation>) -> FeatureValidation {
    FeatureValidation {
        feature_path: path.to_string(),
        languages: languages
            .into_iter()
            .map(|validation| (validation.language.clone(), validation))
            .collect::<BTreeMap<_, _>>(),
    }
}
