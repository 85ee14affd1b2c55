//! Opener that records requests instead of launching anything.

use crate::error::{ErrorKind, Result};
use crate::opener::Opener;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Remembers every path it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the request, then reports [`OpenFailed`](ErrorKind::OpenFailed).
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Opener for RecordingOpener {
    fn open(&self, path: &Path) -> Result<()> {
        self.opened.lock().unwrap_or_else(PoisonError::into_inner).push(path.to_path_buf());
        if self.fail {
            exn::bail!(ErrorKind::OpenFailed("simulated failure".to_string()));
        }
        Ok(())
    }
}
