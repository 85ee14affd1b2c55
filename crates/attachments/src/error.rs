//! Attachment Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The lenient store operations (`delete_file`,
//! `open_file`) swallow these; their `try_*` counterparts surface them.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};

/// An attachment error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for attachment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Path exists but is a directory, socket, broken symlink, etc.
    #[display("not a regular file: {}", _0.display())]
    NotAFile(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Path is not usable here (escapes its bucket, has no file name, root
    /// is not a directory).
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Date label sanitizes to an empty bucket name.
    #[display("invalid date label: {_0:?}")]
    InvalidDateLabel(#[error(not(source))] String),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// No program for opening files with the default application was found.
    #[display("no default-application launcher found on this system")]
    OpenerNotFound,
    /// The launcher ran but reported failure.
    #[display("launcher failed: {_0}")]
    OpenFailed(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Map an I/O error onto the most specific category for `path`.
    pub(crate) fn from_io(err: IoError, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::OpenFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::NotFound(PathBuf::from("a/b.txt")).to_string(),
            "file not found: a/b.txt"
        );
        assert_eq!(
            ErrorKind::InvalidDateLabel("  ".to_string()).to_string(),
            "invalid date label: \"  \""
        );
        assert_eq!(
            ErrorKind::OpenerNotFound.to_string(),
            "no default-application launcher found on this system"
        );
    }

    #[rstest]
    #[case(std::io::ErrorKind::NotFound, "file not found: x")]
    #[case(std::io::ErrorKind::PermissionDenied, "permission denied: x")]
    fn from_io_maps_specific_kinds(#[case] kind: std::io::ErrorKind, #[case] expected: &str) {
        let err = ErrorKind::from_io(IoError::from(kind), Path::new("x"));
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn from_io_falls_back_to_io() {
        let err = ErrorKind::from_io(IoError::other("disk on fire"), Path::new("x"));
        assert!(matches!(err, ErrorKind::Io(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::NotFound(PathBuf::new()).is_retryable());
        assert!(!ErrorKind::InvalidPath(PathBuf::new()).is_retryable());
        assert!(!ErrorKind::OpenerNotFound.is_retryable());
        assert!(ErrorKind::OpenFailed("exit status: 4".into()).is_retryable());
    }
}
