// crates/ud-coverage-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Installs the process-wide tracing subscriber.
// Purpose: Route diagnostics to stderr so stdout stays reserved for reports.
// Dependencies: tracing-subscriber, thiserror
// ============================================================================

//! ## Overview
//! [`init`] installs a `fmt` subscriber writing to stderr. `RUST_LOG` wins
//! when set and parseable; otherwise `--verbose` selects `debug` and the
//! default is `info`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Filter directive used without `--verbose`.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Filter directive used with `--verbose`.
pub const VERBOSE_DIRECTIVE: &str = "debug";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Subscriber installation failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct LoggingError(String);

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Returns the fallback directive for the given verbosity.
#[must_use]
pub const fn directive(verbose: bool) -> &'static str {
    if verbose { VERBOSE_DIRECTIVE } else { DEFAULT_DIRECTIVE }
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when a global subscriber is already installed.
pub fn init(verbose: bool) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_selects_debug() {
        assert_eq!(directive(true), "debug");
        assert_eq!(directive(false), "info");
    }
}
