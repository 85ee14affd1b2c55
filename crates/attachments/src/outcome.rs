//! Per-source results of a batch add.

use crate::error::Error;
use derive_more::Display;
use std::path::PathBuf;

/// Why a source was not copied, when that is not a failure.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum SkipReason {
    #[display("does not exist")]
    Missing,
    #[display("not a regular file")]
    NotAFile,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    pub source: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct Failed {
    pub source: PathBuf,
    pub error: Error,
}

/// Everything [`add_files_detailed`](crate::AttachmentStore::add_files_detailed)
/// did, one entry per source, each list in source order.
#[derive(Debug, Default)]
pub struct AddOutcome {
    /// Destination paths created
    pub added: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<Failed>,
}
impl AddOutcome {
    /// `true` when every source ended up in `added`.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}
