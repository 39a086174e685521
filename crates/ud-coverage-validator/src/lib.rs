// crates/ud-coverage-validator/src/lib.rs
// ============================================================================
// Module: Validator Bridge
// Description: Build, invoke, and parse the external tests format validator.
// Purpose: Supply validator verdicts to the coverage matrix builder.
// Dependencies: serde, serde_json, thiserror, tracing, walkdir, ud-coverage-core
// ============================================================================

//! ## Overview
//! The validator is an external executable with two output dialects. This
//! crate owns everything about talking to it: the rebuild policy, the
//! subprocess runner, one [`ReportAdapter`] per dialect, and the memoizing
//! [`ValidatorBridge`] that implements [`ud_coverage_core::ValidatorSource`].
//!
//! ## Invariants
//! - Each output mode is invoked at most once per bridge until
//!   [`ValidatorBridge::invalidate`] is called.
//! - Exit codes 0 and 1 are successful runs; 1 only means findings exist.
//! - Unparseable output degrades to an empty report with a warning.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod bridge;
pub mod freshness;
pub mod json;
pub mod process;
pub mod text;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::AdapterContext;
pub use adapter::AdapterError;
pub use adapter::ReportAdapter;
pub use bridge::BridgeConfig;
pub use bridge::ValidatorBridge;
pub use bridge::ValidatorMode;
pub use freshness::needs_rebuild;
pub use json::JsonAdapter;
pub use process::CommandOutput;
pub use text::TextAdapter;
