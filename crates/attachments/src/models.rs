//! Attachment models.
//!
//! Nothing here is persisted. Every field is derived from filesystem metadata
//! at the moment a bucket is listed.

use exn::OptionExt;
use std::ffi::OsString;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::{ErrorKind, Result};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const MODIFIED_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

/// A file stored in a date bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name for display. Lossy for names that are not valid UTF-8; use
    /// [`file_name`](Self::file_name) to address the file.
    pub name: String,
    /// File name exactly as stored on disk, unique within its bucket
    pub file_name: OsString,
    /// Absolute path
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Size for humans, see [`human_size`]
    pub size_human: String,
    /// Last modified timestamp, in the local offset when it can be determined
    pub modified: OffsetDateTime,
    /// `YYYY-MM-DD HH:MM` rendering of [`modified`](Self::modified)
    pub modified_display: String,
    /// Last modified, whole seconds since the Unix epoch
    pub modified_ts: i64,
}
impl Attachment {
    pub(crate) fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self> {
        let file_name = path.file_name().ok_or_raise(|| ErrorKind::InvalidPath(path.to_path_buf()))?.to_os_string();
        let modified = local_time(metadata.modified().map_err(|e| ErrorKind::from_io(e, path))?);
        let size_bytes = metadata.len();
        Ok(Self {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            path: path.to_path_buf(),
            size_bytes,
            size_human: human_size(size_bytes),
            modified_display: format_modified(modified),
            modified_ts: modified.unix_timestamp(),
            modified,
        })
    }
}

/// Render a byte count with binary units.
///
/// The value is divided by 1024 until it drops below 1024 or the largest unit
/// (`TB`) is reached. Bytes are shown without decimals, every other unit with
/// one.
///
/// ```
/// use lifetracker_attachments::human_size;
///
/// assert_eq!(human_size(500), "500 B");
/// assert_eq!(human_size(2048), "2.0 KB");
/// assert_eq!(human_size(1_048_576), "1.0 MB");
/// ```
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", SIZE_UNITS[unit])
}

/// Convert to the local offset. Falls back to UTC where the platform refuses
/// to tell us (e.g. multi-threaded processes on some Unixes).
pub(crate) fn local_time(at: SystemTime) -> OffsetDateTime {
    let utc = OffsetDateTime::from(at);
    match UtcOffset::local_offset_at(utc) {
        Ok(offset) => utc.to_offset(offset),
        Err(_) => utc,
    }
}

pub(crate) fn format_modified(at: OffsetDateTime) -> String {
    // Only fails for formats that need fields an OffsetDateTime lacks.
    at.format(MODIFIED_FORMAT).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    #[rstest]
    #[case(0, "0 B")]
    #[case(1, "1 B")]
    #[case(500, "500 B")]
    #[case(1023, "1023 B")]
    #[case(1024, "1.0 KB")]
    #[case(1536, "1.5 KB")]
    #[case(2048, "2.0 KB")]
    #[case(1_048_576, "1.0 MB")]
    #[case(5 * 1024 * 1024 * 1024, "5.0 GB")]
    #[case(1024_u64.pow(4), "1.0 TB")]
    #[case(2048 * 1024_u64.pow(4), "2048.0 TB")]
    fn human_sizes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(human_size(bytes), expected);
    }

    #[test]
    fn human_size_rounds_before_switching_units() {
        // Stays in KB because the unit is chosen before rounding.
        assert_eq!(human_size(1024 * 1024 - 1), "1024.0 KB");
    }

    #[test]
    fn modified_display_format() {
        assert_eq!(format_modified(datetime!(2024-03-15 09:05:59 UTC)), "2024-03-15 09:05");
        assert_eq!(format_modified(datetime!(2024-12-01 23:59 +02:00)), "2024-12-01 23:59");
    }

    #[test]
    fn local_time_preserves_instant() {
        let now = SystemTime::now();
        let converted = local_time(now);
        assert_eq!(converted, OffsetDateTime::from(now));
    }

    #[test]
    fn from_metadata_reads_filesystem() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("receipt.pdf");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        let attachment = Attachment::from_metadata(&path, &metadata).unwrap();
        assert_eq!(attachment.name, "receipt.pdf");
        assert_eq!(attachment.file_name, "receipt.pdf");
        assert_eq!(attachment.path, path);
        assert_eq!(attachment.size_bytes, 2048);
        assert_eq!(attachment.size_human, "2.0 KB");
        assert_eq!(attachment.modified_ts, attachment.modified.unix_timestamp());
        assert_eq!(attachment.modified_display.len(), "YYYY-MM-DD HH:MM".len());
    }
}
