// crates/ud-coverage-render/src/lib.rs
// ============================================================================
// Module: Universal Driver Coverage Render
// Description: Text table and HTML renderers for the coverage matrix.
// Purpose: Turn an immutable coverage matrix into a report document.
// Dependencies: serde, ud-coverage-core
// ============================================================================

//! ## Overview
//! Renderers are pure functions of a [`ud_coverage_core::CoverageMatrix`] and
//! [`RenderOptions`]. They never touch the filesystem; the caller decides
//! where the output goes.
//!
//! ## Invariants
//! - Output is byte-identical for identical inputs.
//! - Every piece of catalog or validator text placed into HTML goes through
//!   [`escape_html`].
//! - The HTML document is self-contained: inline CSS and JS, no network.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod escape;
pub mod format;
pub mod html;
pub mod table;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use escape::deep_link;
pub use escape::escape_html;
pub use format::DEFAULT_TITLE;
pub use format::RenderOptions;
pub use format::ReportFormat;
pub use html::render_html;
pub use table::render_table;
