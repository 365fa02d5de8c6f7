// ============================================================================
// molconv-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Conversion Configuration and Request Structures
//
// This module defines the per-call configuration for the external conversion
// tool (where it lives, how long it may run, where failure records go) and
// the transient request describing one conversion (formats, title, pH,
// hydrogen handling, extra arguments).
//
// USAGE:
// Instances are created by consumers of the library (like molconv-cli) and
// passed to external::run_conversion to drive a single invocation.

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Default install location of the Open Babel executable.
pub const DEFAULT_EXECUTABLE: &str = "/usr/local/bin/babel";

/// Default wall-clock bound on a single conversion, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default directory for failure-record files, relative to the working
/// directory of the calling process.
pub const DEFAULT_LOG_DIR: &str = "logs";

// ============================================================================
// CONVERSION CONFIGURATION
// ============================================================================

/// Per-call configuration for the external conversion tool.
///
/// Holds everything about *how* the tool is run, as opposed to *what* is
/// converted (see [`ConversionRequest`]). There is no global state; every
/// call carries its own copy.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Path to the conversion executable. Must exist before invocation.
    pub executable: PathBuf,

    /// Optional override for the tool's data-library directory, exported
    /// to the child process as BABEL_LIBDIR.
    pub babel_libdir: Option<PathBuf>,

    /// Directory receiving failure-record files.
    pub log_dir: PathBuf,

    /// Wall-clock bound on the child process.
    pub timeout: Duration,

    /// When set, the constructed command line is logged before launch.
    pub debug: bool,
}

impl ConversionConfig {
    /// Creates a configuration for the given executable with default
    /// timeout and log directory.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            babel_libdir: None,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

// ============================================================================
// CONVERSION REQUEST
// ============================================================================

/// Describes one conversion: input and output format tags plus the optional
/// knobs the tool accepts.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Input format tag (e.g. "smiles", "pdb").
    pub in_format: String,

    /// Output format tag (e.g. "inchi", "mol2").
    pub out_format: String,

    /// Optional molecule title, passed as `--title`.
    pub title: Option<String>,

    /// Optional pH for protonation-state adjustment, passed as `-p`.
    /// Only emitted when set.
    pub ph: Option<f64>,

    /// Suppress the tool's automatic hydrogen insertion, exported to the
    /// child process as DONT_FIX_H_INCHI=1.
    pub dont_add_h: bool,

    /// Free-form extra arguments, whitespace-split and appended verbatim.
    pub extra_args: String,
}

impl ConversionRequest {
    pub fn new(in_format: impl Into<String>, out_format: impl Into<String>) -> Self {
        Self {
            in_format: in_format.into(),
            out_format: out_format.into(),
            ..Default::default()
        }
    }
}
