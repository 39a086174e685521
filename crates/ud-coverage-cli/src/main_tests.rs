// crates/ud-coverage-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument mapping and output routing.
// Purpose: Ensure formats, modes, and destinations resolve as documented.
// Dependencies: ud-coverage-cli main helpers
// ============================================================================

//! ## Overview
//! Validates CLI parsing, the stdout/file routing rules, and report writes.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use ud_coverage_config::CoverageConfig;
use ud_coverage_render::ReportFormat;
use ud_coverage_validator::ValidatorMode;

use super::Cli;
use super::FormatArg;
use super::ModeArg;
use super::output_target;
use super::resolve_workspace;
use super::write_report;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn defaults_leave_format_and_mode_to_configuration() {
    let cli = Cli::try_parse_from(["ud-coverage"]).expect("parse");
    assert_eq!(cli.workspace, PathBuf::from("."));
    assert!(cli.format.is_none());
    assert!(cli.mode.is_none());
    assert!(!cli.verbose);
    assert!(!cli.show_version);
}

#[test]
fn flags_map_onto_library_types() {
    let cli = Cli::try_parse_from([
        "ud-coverage",
        "-w",
        "/repo",
        "--format",
        "table",
        "--mode",
        "text",
        "-o",
        "out.txt",
        "--verbose",
    ])
    .expect("parse");
    assert_eq!(cli.format.map(FormatArg::format), Some(ReportFormat::Table));
    assert_eq!(cli.mode.map(ModeArg::mode), Some(ValidatorMode::Text));
    assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
    assert!(cli.verbose);
}

#[test]
fn unknown_formats_are_rejected() {
    assert!(Cli::try_parse_from(["ud-coverage", "--format", "pdf"]).is_err());
}

// ============================================================================
// SECTION: Routing
// ============================================================================

#[test]
fn tables_go_to_stdout_and_html_to_the_configured_file() {
    let config = CoverageConfig::default();
    let workspace = Path::new("/repo");
    assert_eq!(output_target(ReportFormat::Table, None, &config, workspace), None);
    assert_eq!(
        output_target(ReportFormat::Html, None, &config, workspace),
        Some(PathBuf::from("/repo/universal_driver_e2e_test_coverage.html"))
    );
    let explicit = PathBuf::from("report.txt");
    assert_eq!(
        output_target(ReportFormat::Table, Some(explicit.clone()), &config, workspace),
        Some(explicit)
    );
}

#[test]
fn workspace_must_be_a_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").expect("write");
    let err = resolve_workspace(&file).expect_err("file is not a workspace");
    assert!(err.to_string().contains("is not a directory"));
    assert!(resolve_workspace(dir.path()).expect("dir").is_absolute());
}

#[test]
fn report_writes_create_parent_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested/out/report.html");
    write_report(&path, "<html></html>").expect("write report");
    assert_eq!(fs::read_to_string(&path).expect("read back"), "<html></html>");
}
