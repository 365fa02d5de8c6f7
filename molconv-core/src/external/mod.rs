// ============================================================================
// molconv-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interaction with the Open Babel Conversion Tool
//
// This module encapsulates the interaction with the external conversion
// executable: argument construction, child-process launch with a per-call
// deadline, and classification of the outcome into the crate's error
// taxonomy.
//
// KEY COMPONENTS:
// - babel_executor: command construction and the single-invocation runner
// - check_dependency: startup probe for the configured executable

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains argument building logic and the conversion runner
pub mod babel_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use babel_executor::{build_args, build_env, command_line, run_conversion};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that the configured conversion executable is present and starts.
///
/// Runs the executable with its help flag, discarding all output; only the
/// ability to launch is of interest. Distinguishes a missing binary from
/// one that exists but fails to start.
pub fn check_dependency(executable: &Path) -> CoreResult<()> {
    let result = Command::new(executable)
        .arg("-H")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found conversion tool: {}", executable.display());
            Ok(())
        }
        Err(e) => {
            if e.kind() == io::ErrorKind::NotFound {
                log::warn!("Conversion tool '{}' not found.", executable.display());
                Err(CoreError::DependencyNotFound(executable.to_path_buf()))
            } else {
                log::error!(
                    "Failed to start conversion tool '{}': {}",
                    executable.display(),
                    e
                );
                Err(CoreError::CommandStart(
                    executable.display().to_string(),
                    e,
                ))
            }
        }
    }
}
