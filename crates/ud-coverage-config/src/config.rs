// crates/ud-coverage-config/src/config.rs
// ============================================================================
// Module: Coverage Configuration
// Description: Configuration loading and validation for ud-coverage.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, tracing, ud-coverage-core,
//               ud-coverage-render, ud-coverage-validator
// ============================================================================

//! ## Overview
//! Configuration is resolved in this order: an explicit path, the
//! `UD_COVERAGE_CONFIG` environment variable, `<workspace>/ud-coverage.toml`
//! when it exists, and finally built-in defaults. Files are size-limited,
//! must be UTF-8, reject unknown keys, and are validated before use.
//!
//! ## Invariants
//! - A loaded [`CoverageConfig`] has passed [`CoverageConfig::validate`].
//! - Relative paths are interpreted against the workspace root, except
//!   `validator.binary`, which is relative to `validator.dir`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use ud_coverage_core::CORE_LANGUAGE;
use ud_coverage_core::Language;
use ud_coverage_core::LanguagePolicy;
use ud_coverage_render::DEFAULT_TITLE;
use ud_coverage_render::RenderOptions;
use ud_coverage_render::ReportFormat;
use ud_coverage_validator::BridgeConfig;
use ud_coverage_validator::ValidatorMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Configuration filename looked up in the workspace root.
pub const DEFAULT_CONFIG_NAME: &str = "ud-coverage.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "UD_COVERAGE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum report title length.
const MAX_TITLE_LENGTH: usize = 256;
/// Maximum number of language aliases or pinned languages.
const MAX_LANGUAGE_ENTRIES: usize = 64;

/// Default specifications directory.
const DEFAULT_FEATURES_DIR: &str = "tests/definitions";
/// Default validator crate directory.
const DEFAULT_VALIDATOR_DIR: &str = "tests/tests_format_validator";
/// Default validator binary, relative to the validator directory.
const DEFAULT_VALIDATOR_BINARY: &str = "target/debug/tests_format_validator";
/// Default build tool.
const DEFAULT_BUILD_TOOL: &str = "cargo";
/// Default validator binary name for `<build-tool> run --bin`.
const DEFAULT_BIN_NAME: &str = "tests_format_validator";
/// Default HTML output file.
const DEFAULT_HTML_OUTPUT: &str = "universal_driver_e2e_test_coverage.html";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level `ud-coverage.toml` model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageConfig {
    /// Specification discovery.
    pub catalog: CatalogConfig,
    /// Validator location and invocation.
    pub validator: ValidatorConfig,
    /// Language canonicalization and ordering.
    pub languages: LanguagesConfig,
    /// Report presentation.
    pub report: ReportConfig,
    /// File the configuration was read from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// `[catalog]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Specifications directory, relative to the workspace.
    pub features_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            features_dir: PathBuf::from(DEFAULT_FEATURES_DIR),
        }
    }
}

/// `[validator]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Validator crate directory, relative to the workspace.
    pub dir: PathBuf,
    /// Prebuilt binary, relative to `dir`.
    pub binary: PathBuf,
    /// Build tool program.
    pub build_tool: String,
    /// Binary name used in text mode.
    pub bin_name: String,
    /// Rebuild a stale binary before use.
    pub rebuild: bool,
    /// Output dialect used for the full report.
    pub mode: ValidatorMode,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_VALIDATOR_DIR),
            binary: PathBuf::from(DEFAULT_VALIDATOR_BINARY),
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            bin_name: DEFAULT_BIN_NAME.to_string(),
            rebuild: true,
            mode: ValidatorMode::Json,
        }
    }
}

/// `[languages]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguagesConfig {
    /// Languages shown first, in this order.
    pub pinned: Vec<String>,
    /// Reported name to canonical name rewrites.
    pub aliases: BTreeMap<String, String>,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            pinned: vec![CORE_LANGUAGE.to_string()],
            aliases: BTreeMap::from([("rust".to_string(), CORE_LANGUAGE.to_string())]),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Document title.
    pub title: String,
    /// Default format when the command line does not choose one.
    pub format: ReportFormat,
    /// HTML output file, relative to the workspace.
    pub html_output: PathBuf,
    /// URL prefix for source deep links; empty means workspace-relative.
    pub source_link_base: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            format: ReportFormat::Html,
            html_output: PathBuf::from(DEFAULT_HTML_OUTPUT),
            source_link_base: String::new(),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl CoverageConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a resolved file cannot be read, parsed,
    /// or validated.
    pub fn load(path: Option<&Path>, workspace: &Path) -> Result<Self, ConfigError> {
        let env_path = env::var(CONFIG_ENV_VAR).ok();
        match resolve_path(path, env_path.as_deref(), workspace)? {
            Some(resolved) => Self::load_file(&resolved),
            None => {
                debug!(workspace = %workspace.display(), "no config file; using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Loads and validates a specific configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::parse(content)?;
        config.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is not valid configuration.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.catalog.validate()?;
        self.validator.validate()?;
        self.languages.validate()?;
        self.report.validate()
    }
}

// ============================================================================
// SECTION: Derived Settings
// ============================================================================

impl CoverageConfig {
    /// Language alias and ordering policy.
    #[must_use]
    pub fn language_policy(&self) -> LanguagePolicy {
        LanguagePolicy::new(
            self.languages.aliases.iter().map(|(from, to)| (from.clone(), to.clone())),
            self.languages.pinned.iter().cloned(),
        )
    }

    /// Validator bridge settings rooted at `workspace`.
    #[must_use]
    pub fn bridge_config(&self, workspace: &Path) -> BridgeConfig {
        BridgeConfig {
            workspace: workspace.to_path_buf(),
            features_dir: self.catalog.features_dir.clone(),
            validator_dir: self.validator.dir.clone(),
            binary: self.validator.binary.clone(),
            build_tool: self.validator.build_tool.clone(),
            bin_name: self.validator.bin_name.clone(),
            rebuild: self.validator.rebuild,
            mode: self.validator.mode,
            policy: self.language_policy(),
        }
    }

    /// Absolute specifications directory.
    #[must_use]
    pub fn features_dir(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.catalog.features_dir)
    }

    /// HTML renderer options.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        let base = self.report.source_link_base.trim();
        RenderOptions {
            title: self.report.title.trim().to_string(),
            source_link_base: if base.is_empty() { None } else { Some(base.to_string()) },
        }
    }

    /// Default HTML output path.
    #[must_use]
    pub fn html_output(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.report.html_output)
    }
}

// ============================================================================
// SECTION: Section Validation
// ============================================================================

impl CatalogConfig {
    /// Validates the catalog section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_relative_path("catalog.features_dir", &self.features_dir)
    }
}

impl ValidatorConfig {
    /// Validates the validator section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_relative_path("validator.dir", &self.dir)?;
        validate_relative_path("validator.binary", &self.binary)?;
        validate_token("validator.build_tool", &self.build_tool)?;
        validate_token("validator.bin_name", &self.bin_name)?;
        if self.bin_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(
                "validator.bin_name must not contain path separators".to_string(),
            ));
        }
        Ok(())
    }
}

impl LanguagesConfig {
    /// Validates the languages section.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.pinned.len() > MAX_LANGUAGE_ENTRIES || self.aliases.len() > MAX_LANGUAGE_ENTRIES {
            return Err(ConfigError::Invalid(format!(
                "languages accepts at most {MAX_LANGUAGE_ENTRIES} pinned entries and aliases"
            )));
        }
        let mut seen = BTreeSet::new();
        for name in &self.pinned {
            validate_token("languages.pinned", name)?;
            if !seen.insert(Language::new(name)) {
                return Err(ConfigError::Invalid(format!("languages.pinned lists {name} twice")));
            }
        }
        for (from, to) in &self.aliases {
            validate_token("languages.aliases", from)?;
            validate_token("languages.aliases", to)?;
        }
        Ok(())
    }
}

impl ReportConfig {
    /// Validates the report section.
    fn validate(&self) -> Result<(), ConfigError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ConfigError::Invalid("report.title must be non-empty".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ConfigError::Invalid("report.title exceeds max length".to_string()));
        }
        validate_path_length("report.html_output", &self.html_output)?;
        if self.html_output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("report.html_output must be non-empty".to_string()));
        }
        let base = self.source_link_base.trim();
        if !base.is_empty() {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "report.source_link_base must be an http(s) url".to_string(),
                ));
            }
            if base.contains(char::is_whitespace) || base.contains(['"', '<', '>']) {
                return Err(ConfigError::Invalid(
                    "report.source_link_base contains invalid characters".to_string(),
                ));
            }
            if base.len() > MAX_TOTAL_PATH_LENGTH {
                return Err(ConfigError::Invalid(
                    "report.source_link_base exceeds max length".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; `None` means built-in defaults.
fn resolve_path(
    path: Option<&Path>,
    env_path: Option<&str>,
    workspace: &Path,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = env_path.map(str::trim).filter(|value| !value.is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let candidate = workspace.join(DEFAULT_CONFIG_NAME);
    Ok(candidate.is_file().then_some(candidate))
}

/// Validates the resolved config path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a non-empty configured path against length limits.
fn validate_relative_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    validate_path_length(field, path)
}

/// Validates total and per-component path length.
fn validate_path_length(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a single-word setting (tool name, language name).
fn validate_token(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.contains(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!("{field} must not contain whitespace")));
    }
    if trimmed.len() > MAX_PATH_COMPONENT_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::use_debug,
        reason = "Test assertions fail loudly on unexpected variants."
    )]

    use super::*;

    #[test]
    fn explicit_path_beats_environment_and_workspace() {
        let workspace = Path::new("/nonexistent/workspace");
        let explicit = Path::new("custom.toml");
        assert!(matches!(
            resolve_path(Some(explicit), Some("env.toml"), workspace),
            Ok(Some(path)) if path == explicit
        ));
        assert!(matches!(
            resolve_path(None, Some("env.toml"), workspace),
            Ok(Some(path)) if path == Path::new("env.toml")
        ));
        assert!(matches!(resolve_path(None, Some("  "), workspace), Ok(None)));
        assert!(matches!(resolve_path(None, None, workspace), Ok(None)));
    }

    #[test]
    fn overlong_environment_path_is_rejected() {
        let long = "a".repeat(MAX_TOTAL_PATH_LENGTH + 1);
        match resolve_path(None, Some(&long), Path::new(".")) {
            Err(ConfigError::Invalid(message)) => assert!(message.contains("max length")),
            other => panic!("expected invalid path, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(CoverageConfig::default().validate().is_ok());
    }
}
