// crates/ud-coverage-cli/src/main.rs
// ============================================================================
// Module: Universal Driver Coverage CLI Entry Point
// Description: Argument parsing and output routing for the coverage report.
// Purpose: Generate a table or HTML coverage report for a driver workspace.
// Dependencies: clap, thiserror, tracing, ud-coverage-cli, ud-coverage-config,
//               ud-coverage-render, ud-coverage-validator
// ============================================================================

//! ## Overview
//! `ud-coverage` loads the workspace configuration, runs the report
//! pipeline, and routes the result: tables go to stdout unless `--output` is
//! given, HTML goes to `--output` or the configured default path. All
//! user-facing strings come from the message catalog; diagnostics go to
//! stderr through `tracing`.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use thiserror::Error;
use tracing::info;
use ud_coverage_cli::logging;
use ud_coverage_cli::pipeline;
use ud_coverage_cli::pipeline::ReportRequest;
use ud_coverage_cli::t;
use ud_coverage_config::CoverageConfig;
use ud_coverage_render::ReportFormat;
use ud_coverage_validator::ValidatorMode;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Command-line arguments for `ud-coverage`.
#[derive(Debug, Parser)]
#[command(
    name = "ud-coverage",
    about = "Generate a Universal Driver test coverage report",
    disable_version_flag = true
)]
struct Cli {
    /// Workspace root containing specifications and driver tests.
    #[arg(short = 'w', long = "workspace", value_name = "DIR", default_value = ".")]
    workspace: PathBuf,
    /// Output format (defaults to `report.format` from the configuration).
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<FormatArg>,
    /// Output file; tables default to stdout, HTML to `report.html_output`.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
    /// Configuration file (overrides `UD_COVERAGE_CONFIG` and the workspace file).
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Validator output dialect (defaults to `validator.mode`).
    #[arg(long = "mode", value_enum)]
    mode: Option<ModeArg>,
    /// Enable debug logging.
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,
    /// Print the version and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
}

/// Report format accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Plain-text table.
    Table,
    /// Tabbed HTML document.
    Html,
}

impl FormatArg {
    /// Returns the renderer format.
    const fn format(self) -> ReportFormat {
        match self {
            Self::Table => ReportFormat::Table,
            Self::Html => ReportFormat::Html,
        }
    }
}

/// Validator dialect accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Prebuilt binary with structured JSON output.
    Json,
    /// `cargo run` with verbose text output.
    Text,
}

impl ModeArg {
    /// Returns the bridge mode.
    const fn mode(self) -> ValidatorMode {
        match self {
            Self::Json => ValidatorMode::Json,
            Self::Text => ValidatorMode::Text,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a rendered message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Message shown to the user.
    message: String,
}

impl CliError {
    /// Creates a new CLI error.
    const fn new(message: String) -> Self {
        Self { message }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and generates the report.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        write_stdout_line(&t!("main.version", version = env!("CARGO_PKG_VERSION")))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(cli.verbose)
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;

    let workspace = resolve_workspace(&cli.workspace)?;
    let config = CoverageConfig::load(cli.config.as_deref(), &workspace)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let format = cli.format.map_or(config.report.format, FormatArg::format);
    let mode = cli.mode.map_or(config.validator.mode, ModeArg::mode);

    let request = ReportRequest {
        workspace: &workspace,
        config: &config,
        format,
        mode,
    };
    let report = pipeline::generate(&request)
        .map_err(|err| CliError::new(t!("report.failed", error = err)))?;
    info!(
        features = report.matrix.features.len(),
        languages = report.matrix.languages.len(),
        missing = report.matrix.missing.len(),
        "coverage report generated"
    );

    match output_target(format, cli.output, &config, &workspace) {
        None => write_stdout_bytes(report.rendered.as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
        Some(path) => {
            write_report(&path, &report.rendered)?;
            write_stdout_line(&t!(
                "report.written",
                format = format_label(format),
                path = path.display()
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves `path` to an absolute directory.
fn resolve_workspace(path: &Path) -> CliResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|err| {
        CliError::new(t!("workspace.resolve_failed", path = path.display(), error = err))
    })?;
    if !absolute.is_dir() {
        return Err(CliError::new(t!("workspace.not_a_directory", path = absolute.display())));
    }
    Ok(absolute)
}

/// Chooses the output file, or `None` for stdout.
fn output_target(
    format: ReportFormat,
    output: Option<PathBuf>,
    config: &CoverageConfig,
    workspace: &Path,
) -> Option<PathBuf> {
    match (format, output) {
        (_, Some(path)) => Some(path),
        (ReportFormat::Table, None) => None,
        (ReportFormat::Html, None) => Some(config.html_output(workspace)),
    }
}

/// Human label for the written-report notice.
const fn format_label(format: ReportFormat) -> &'static str {
    match format {
        ReportFormat::Table => "Table",
        ReportFormat::Html => "HTML",
    }
}

/// Writes `contents` to `path`, creating parent directories.
fn write_report(path: &Path, contents: &str) -> CliResult<()> {
    let file_error = |err: std::io::Error| {
        CliError::new(t!("report.file_failed", path = path.display(), error = err))
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(file_error)?;
    }
    fs::write(path, contents).map_err(file_error)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
