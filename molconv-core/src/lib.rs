//! Core library for molecular file-format conversion via the external
//! Open Babel tool.
//!
//! This crate shells out to the conversion executable for a single
//! conversion at a time, bounding the call with a wall-clock timeout and
//! classifying failures as timeout, tool rejection, or undecodable output.
//! Every failure leaves a content-addressed record pair on disk for offline
//! reproduction of the exact failing invocation.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use molconv_core::{ConversionConfig, ConversionRequest, Payload, run_conversion};
//!
//! let config = ConversionConfig::default();
//! let request = ConversionRequest::new("smiles", "inchi");
//!
//! let inchi = run_conversion(&config, &request, &Payload::from("CCC")).unwrap();
//! println!("{inchi}");
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod failure_log;
pub mod payload;

// Re-exports for public API
pub use config::{ConversionConfig, ConversionRequest};
pub use error::{CoreError, CoreResult};
pub use external::{build_args, build_env, check_dependency, command_line, run_conversion};
pub use failure_log::{dump_failure, failure_id, FAILURE_ID_LEN};
pub use payload::Payload;
