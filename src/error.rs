//! Application Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("attachment storage failed")]
    Storage,
    #[display("could not delete {}", _0.display())]
    Delete(#[error(not(source))] PathBuf),
    #[display("no attachment named {}", _0.display())]
    NoSuchAttachment(#[error(not(source))] PathBuf),
}
