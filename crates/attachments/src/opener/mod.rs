//! "Open with the default application" as a swappable capability.
//!
//! The store never decides how a file gets opened; it hands the path to an
//! [`Opener`] chosen when the application starts. [`SystemOpener`] delegates to
//! the platform launcher, [`RecordingOpener`] (feature `mock`) remembers what it
//! was asked to open so tests never spawn processes.

#[cfg(any(test, feature = "mock"))]
mod mock;
mod system;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::RecordingOpener;
pub use self::system::{Launcher, SystemOpener};

use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

pub type OpenerHandle = Arc<dyn Opener>;

/// Hands a file or directory to whatever the host considers its default
/// handler.
///
/// Implementations should return once the handler has been launched; whether
/// it went on to display anything is not observable.
pub trait Opener: Send + Sync {
    fn open(&self, path: &Path) -> Result<()>;
}
