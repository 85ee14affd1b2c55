//! Config Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No home directory, so no platform default for config or data paths.
    #[display("could not determine a home directory for default paths")]
    NoHomeDirectory,
    /// An explicitly requested config file does not exist.
    #[display("config file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Merged providers could not be extracted into [`Config`](crate::Config).
    #[display("invalid configuration: {_0}")]
    Load(#[error(not(source))] String),
}
