// crates/ud-coverage-validator/src/freshness.rs
// ============================================================================
// Module: Rebuild Policy
// Description: Decide whether the validator binary is older than its sources.
// Purpose: Rebuild the validator only when its inputs changed.
// Dependencies: walkdir, ud-coverage-core
// ============================================================================

//! ## Overview
//! The binary is stale when it is missing, or when the manifest, the
//! lockfile, or any file under `src/` (recursively) has a newer modification
//! time. Missing manifest or lockfile files are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use ud_coverage_core::ValidatorError;
use walkdir::WalkDir;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Build inputs at the validator root.
const ROOT_INPUTS: [&str; 2] = ["Cargo.toml", "Cargo.lock"];
/// Source directory walked recursively.
const SOURCE_DIR: &str = "src";

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Returns true when `binary` must be rebuilt from `validator_dir`.
///
/// # Errors
///
/// Returns [`ValidatorError::Io`] when modification times cannot be read.
pub fn needs_rebuild(validator_dir: &Path, binary: &Path) -> Result<bool, ValidatorError> {
    let built = match modified(binary) {
        Ok(time) => time,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(io_error(binary, &err)),
    };

    for name in ROOT_INPUTS {
        let input = validator_dir.join(name);
        match modified(&input) {
            Ok(time) if time > built => return Ok(true),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(io_error(&input, &err)),
        }
    }

    let sources = validator_dir.join(SOURCE_DIR);
    if !sources.is_dir() {
        return Ok(false);
    }
    for entry in WalkDir::new(&sources) {
        let entry = entry.map_err(|err| ValidatorError::Io(err.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let time = modified(entry.path()).map_err(|err| io_error(entry.path(), &err))?;
        if time > built {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns the modification time of `path`.
fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Wraps an io error with its path.
fn io_error(path: &Path, err: &io::Error) -> ValidatorError {
    ValidatorError::Io(format!("{}: {err}", path.display()))
}
