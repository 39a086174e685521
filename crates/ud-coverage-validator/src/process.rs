// crates/ud-coverage-validator/src/process.rs
// ============================================================================
// Module: Subprocess Runner
// Description: Blocking execution of build and validator commands.
// Purpose: Capture exit status and output of external tools in one place.
// Dependencies: tracing, ud-coverage-core
// ============================================================================

//! ## Overview
//! Commands run to completion with stdin closed and both output streams
//! captured. There is no timeout; a hung validator hangs the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use std::process::Stdio;

use tracing::debug;
use ud_coverage_core::ValidatorError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns true when the command exited with one of `codes`.
    #[must_use]
    pub fn exited_with(&self, codes: &[i32]) -> bool {
        self.code.is_some_and(|code| codes.contains(&code))
    }

    /// Returns the exit code as text (`signal` when absent).
    #[must_use]
    pub fn code_label(&self) -> String {
        self.code.map_or_else(|| "signal".to_string(), |code| code.to_string())
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs `program` with `args` in `cwd` and waits for it.
///
/// # Errors
///
/// Returns [`ValidatorError::Spawn`] when the process cannot be started.
pub fn run<I, S>(program: &Path, args: I, cwd: &Path) -> Result<CommandOutput, ValidatorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    command.current_dir(cwd);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    debug!(program = %program.display(), cwd = %cwd.display(), "running command");

    let output = command
        .output()
        .map_err(|err| ValidatorError::Spawn(format!("{}: {err}", program.display())))?;
    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
