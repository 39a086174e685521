// crates/ud-coverage-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for the CLI.
// Purpose: Keep every user-facing string in one table.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! All runtime output of the `ud-coverage` binary is routed through the
//! [`t!`](crate::t) macro, which looks a key up in [`CATALOG_EN`] and
//! substitutes `{placeholder}` arguments.
//!
//! ## Invariants
//! - The catalog map is built once and read-only thereafter.
//! - Missing keys render as the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Debug, Clone)]
pub struct MessageArg {
    /// Placeholder name without braces (for example `path`).
    pub key: &'static str,
    /// Value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English message templates keyed by stable identifiers.
pub const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "ud-coverage {version}"),
    ("workspace.resolve_failed", "Failed to resolve workspace {path}: {error}"),
    ("workspace.not_a_directory", "Workspace {path} is not a directory"),
    ("config.load_failed", "Failed to load configuration: {error}"),
    ("logging.init_failed", "Failed to initialize logging: {error}"),
    ("report.failed", "Coverage report failed: {error}"),
    ("report.written", "{format} report generated: {path}"),
    ("report.file_failed", "Failed to write report to {path}: {error}"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
];

/// Lazily built lookup map over [`CATALOG_EN`].
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders the template for `key`, substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// `$key` must match a catalog entry; named arguments fill `{placeholder}`
/// positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
