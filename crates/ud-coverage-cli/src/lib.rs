// crates/ud-coverage-cli/src/lib.rs
// ============================================================================
// Module: Universal Driver Coverage CLI Library
// Description: Shared helpers for the coverage report command-line interface.
// Purpose: Provide the message catalog, logging setup, and report pipeline.
// Dependencies: tracing-subscriber, ud-coverage-config, ud-coverage-core,
//               ud-coverage-render, ud-coverage-validator
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) parses arguments and decides where
//! output goes. Everything it calls lives here so integration tests can drive
//! the same code: [`pipeline::generate`] runs catalog, validator, builder and
//! renderer in order; [`logging::init`] installs the stderr subscriber; and
//! [`i18n`] holds every user-facing string.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and the [`t!`](crate::t) macro.
pub mod i18n;
pub mod logging;
pub mod pipeline;
