//! Collision-free destination names and file name validation.
//!
//! Names supplied by callers are treated as a single path component inside a
//! bucket; anything that would address a different directory is rejected.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates that `name` is exactly one normal path component.
///
/// > **Note:** Trailing separators are tolerated (`"a.txt/"` is `"a.txt"`),
/// >           because [`Path::components`] already drops them.
///
/// # Examples
///
/// ```
/// use lifetracker_attachments::validate_file_name;
///
/// assert_eq!(validate_file_name("receipt.pdf").unwrap(), "receipt.pdf");
/// assert!(validate_file_name("../receipt.pdf").is_err());
/// assert!(validate_file_name("scans/receipt.pdf").is_err());
/// assert!(validate_file_name("").is_err());
/// ```
pub fn validate_file_name<P: AsRef<Path> + ?Sized>(name: &P) -> Result<&OsStr> {
    let path = name.as_ref();
    let mut components = path.components();
    match (components.next(), components.next()) {
        // Null bytes pass through Path::components() on Unix but cause
        // truncation in C-based syscalls.
        (Some(Component::Normal(s)), None) if !s.as_encoded_bytes().contains(&0) => Ok(s),
        _ => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
    }
}

/// Returns a path inside `dir` that does not exist yet, preferring the base
/// name of `filename` unchanged.
///
/// On collision the stem gets a counter, `report.pdf` becoming
/// `report (1).pdf`, then `report (2).pdf`, and so on with no upper bound.
/// Any directory part of `filename` is discarded. The check is not atomic with
/// whatever the caller does next.
///
/// # Errors
///
/// [`InvalidPath`](ErrorKind::InvalidPath) if `filename` has no final name
/// component (empty, `..`, a root).
pub fn unique_destination(dir: impl AsRef<Path>, filename: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let filename = filename.as_ref();
    let Some(name) = filename.file_name() else {
        exn::bail!(ErrorKind::InvalidPath(filename.to_path_buf()));
    };

    let candidate = dir.join(name);
    if !occupied(&candidate) {
        return Ok(candidate);
    }
    let (stem, extension) = split_name(name);
    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(numbered(stem, extension, counter));
        if !occupied(&candidate) {
            tracing::trace!(candidate = %candidate.display(), attempts = counter, "Resolved name collision");
            return Ok(candidate);
        }
        counter += 1;
    }
}

// Dangling symlinks count as taken; copying onto one would write through it.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Split into stem and extension. Dotfiles (`.env`) and names ending in a dot
/// (`notes.`) have no extension.
fn split_name(name: &OsStr) -> (&OsStr, Option<&OsStr>) {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(extension)) if !extension.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    }
}

fn numbered(stem: &OsStr, extension: Option<&OsStr>, counter: u64) -> OsString {
    let mut name = stem.to_os_string();
    name.push(format!(" ({counter})"));
    if let Some(extension) = extension {
        name.push(".");
        name.push(extension);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[rstest]
    #[case("report.pdf")]
    #[case("archive.tar.gz")]
    #[case(".env")]
    #[case("no_extension")]
    fn empty_directory_keeps_name(#[case] filename: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = unique_destination(temp_dir.path(), filename).unwrap();
        assert_eq!(dest, temp_dir.path().join(filename));
    }

    #[test]
    fn directory_part_is_discarded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = unique_destination(temp_dir.path(), "/somewhere/else/scan.png").unwrap();
        assert_eq!(dest, temp_dir.path().join("scan.png"));
        assert_eq!(dest.parent().unwrap(), temp_dir.path());
    }

    #[test]
    fn first_collision_gets_counter_one() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(&temp_dir.path().join("a.txt"));
        let dest = unique_destination(temp_dir.path(), "a.txt").unwrap();
        assert_eq!(dest, temp_dir.path().join("a (1).txt"));
    }

    #[test]
    fn skips_every_taken_counter() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(&temp_dir.path().join("f.txt"));
        touch(&temp_dir.path().join("f (1).txt"));
        let dest = unique_destination(temp_dir.path(), "f.txt").unwrap();
        assert_eq!(dest, temp_dir.path().join("f (2).txt"));
    }

    #[test]
    fn counter_fills_first_gap() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(&temp_dir.path().join("f.txt"));
        touch(&temp_dir.path().join("f (2).txt"));
        let dest = unique_destination(temp_dir.path(), "f.txt").unwrap();
        assert_eq!(dest, temp_dir.path().join("f (1).txt"));
    }

    #[rstest]
    #[case("archive.tar.gz", "archive.tar (1).gz")]
    #[case(".env", ".env (1)")]
    #[case("Makefile", "Makefile (1)")]
    #[case("notes.", "notes. (1)")]
    fn counter_placement(#[case] filename: &str, #[case] expected: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(&temp_dir.path().join(filename));
        let dest = unique_destination(temp_dir.path(), filename).unwrap();
        assert_eq!(dest, temp_dir.path().join(expected));
    }

    #[test]
    fn existing_directory_counts_as_collision() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("photos")).unwrap();
        let dest = unique_destination(temp_dir.path(), "photos").unwrap();
        assert_eq!(dest, temp_dir.path().join("photos (1)"));
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case("/")]
    fn nameless_input_is_rejected(#[case] filename: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = unique_destination(temp_dir.path(), filename).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[rstest]
    #[case("a.txt", "a.txt")]
    #[case("with space (1).txt", "with space (1).txt")]
    #[case("trailing/", "trailing")]
    fn valid_file_names(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(validate_file_name(name).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("../a.txt")]
    #[case("./a.txt")]
    #[case("dir/a.txt")]
    #[case("/etc/passwd")]
    #[case("a\0b")]
    fn invalid_file_names(#[case] name: &str) {
        let err = validate_file_name(name).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }
}
