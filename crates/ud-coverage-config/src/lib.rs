// crates/ud-coverage-config/src/lib.rs
// ============================================================================
// Module: Universal Driver Coverage Config
// Description: Configuration model and validation for ud-coverage.
// Purpose: Load `ud-coverage.toml` and derive component settings from it.
// Dependencies: serde, thiserror, toml, tracing, ud-coverage-core,
//               ud-coverage-render, ud-coverage-validator
// ============================================================================

//! ## Overview
//! A single optional TOML file tunes where specifications and the validator
//! live, how language names are canonicalized, and how the report is
//! presented. Every field has a default, so an absent file is valid.
//!
//! ## Index
//! - [`CoverageConfig`] with its sections and [`ConfigError`]
//! - Resolution constants: [`DEFAULT_CONFIG_NAME`], [`CONFIG_ENV_VAR`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CONFIG_ENV_VAR;
pub use config::CatalogConfig;
pub use config::ConfigError;
pub use config::CoverageConfig;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::LanguagesConfig;
pub use config::MAX_CONFIG_FILE_SIZE;
pub use config::ReportConfig;
pub use config::ValidatorConfig;
