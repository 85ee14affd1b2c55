//! File attachments grouped by date, kept on the local filesystem.
//!
//! - [`bucket_name`] turns a caller's date label into a safe directory name
//! - [`unique_destination`] picks a free file name, `a.txt` then `a (1).txt`
//! - [`AttachmentStore`] copies files in, lists, deletes and opens them
//!
//! ```text
//! <root>/
//!   <bucket_name(date_label)>/
//!     files/
//!       receipt.pdf
//!       receipt (1).pdf
//! ```
//!
//! No manifest is written; size and modification time are read from the
//! filesystem each time a bucket is listed.

mod bucket;
pub mod error;
mod models;
mod naming;
pub mod opener;
mod outcome;
mod store;

pub use crate::bucket::bucket_name;
pub use crate::models::{Attachment, human_size};
pub use crate::naming::{unique_destination, validate_file_name};
pub use crate::opener::{Opener, OpenerHandle, SystemOpener};
pub use crate::outcome::{AddOutcome, Failed, SkipReason, Skipped};
pub use crate::store::{AttachmentStore, FILES_DIR};
