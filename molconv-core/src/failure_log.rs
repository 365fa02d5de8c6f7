//! Failure-record persistence for postmortem debugging.
//!
//! Every abnormal conversion leaves a forensic artifact on disk before the
//! error propagates: the offending input and the exact command line that
//! was attempted. Records are content-addressed, so repeated failures on
//! the same (command, input) pair collapse to one file pair instead of
//! growing the log directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreResult;
use crate::payload::Payload;

/// Hex characters kept from the record digest for the filename.
pub const FAILURE_ID_LEN: usize = 8;

/// Derives the content-addressed identifier for a (command, input) pair.
pub fn failure_id(command_line: &str, payload: &Payload) -> String {
    let mut content = command_line.as_bytes().to_vec();
    content.extend_from_slice(payload.as_bytes());
    let digest = sha256::digest(content.as_slice());
    digest[..FAILURE_ID_LEN].to_string()
}

/// Writes a failure-record pair to `log_dir`: the raw input payload to
/// `<id>.log` and the attempted command line, newline-terminated, to
/// `<id>.sh`. Creates the directory if needed. Returns the `.log` path.
pub fn dump_failure(log_dir: &Path, payload: &Payload, command_line: &str) -> CoreResult<PathBuf> {
    fs::create_dir_all(log_dir)?;

    let id = failure_id(command_line, payload);
    let log_path = log_dir.join(format!("{id}.log"));
    let sh_path = log_dir.join(format!("{id}.sh"));

    fs::write(&log_path, payload.as_bytes())?;
    fs::write(&sh_path, format!("{command_line}\n"))?;

    log::warn!(
        "Dumped failing conversion input to {} (command in {})",
        log_path.display(),
        sh_path.display()
    );
    Ok(log_path)
}
