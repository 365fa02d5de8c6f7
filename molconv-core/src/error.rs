use std::path::PathBuf;
use std::string::FromUtf8Error;
use std::time::Duration;

use thiserror::Error;

/// Custom error types for molconv
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Conversion tool timed out after {timeout:?} (command: {command})")]
    Timeout { timeout: Duration, command: String },

    #[error("Conversion tool rejected the input: {0}")]
    ToolFailure(String),

    #[error("Conversion tool output is not valid UTF-8: {0}")]
    OutputNotUtf8(#[from] FromUtf8Error),

    #[error("Required external tool not found: {}", .0.display())]
    DependencyNotFound(PathBuf),
}

/// Result type for molconv operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
