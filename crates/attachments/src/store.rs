//! Date-bucketed attachment store on the local filesystem.
//!
//! Files live at `<root>/<bucket_name(date_label)>/files/<name>`. There is no
//! index or manifest: every query reads the filesystem again, and the store
//! holds nothing in memory beyond its root and opener.

use crate::bucket::bucket_name;
use crate::error::{ErrorKind, Result};
use crate::models::Attachment;
use crate::naming::{unique_destination, validate_file_name};
use crate::opener::{OpenerHandle, SystemOpener};
use crate::outcome::{AddOutcome, Failed, SkipReason, Skipped};
use std::fs::{self, File, FileTimes, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Directory inside each date bucket that holds the files.
pub const FILES_DIR: &str = "files";

/// Copies, lists, deletes and opens attachments grouped by date label.
///
/// All operations are synchronous and assume this process is the only writer
/// under `root`; the collision check in [`add_files`](Self::add_files) and the
/// copy that follows it are not atomic against other processes.
///
/// # Examples
///
/// ```no_run
/// use lifetracker_attachments::AttachmentStore;
/// use lifetracker_attachments::error::Result;
///
/// # fn example() -> Result<()> {
/// let store = AttachmentStore::new("/home/me/.local/share/lifetracker/attachments")?;
/// store.add_files("2024-03-15", ["/tmp/receipt.pdf"])?;
/// for attachment in store.list_files("2024-03-15")? {
///     println!("{} {}", attachment.name, attachment.size_human);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    opener: OpenerHandle,
}

impl std::fmt::Debug for AttachmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentStore").field("root", &self.root).finish_non_exhaustive()
    }
}

impl AttachmentStore {
    /// Open (creating if needed, parents included) a store rooted at `root`.
    ///
    /// Relative roots are resolved against the current directory once, here.
    /// Files are opened with the detected [`SystemOpener`].
    ///
    /// # Errors
    ///
    /// [`InvalidPath`](ErrorKind::InvalidPath) if `root` exists but is not a
    /// directory; I/O errors from creating it.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref()).map_err(|e| ErrorKind::from_io(e, root.as_ref()))?;
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            fs::create_dir_all(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
            tracing::debug!(root = %root.display(), "Created attachment root");
        }
        Ok(Self { root, opener: Arc::new(SystemOpener::detect()) })
    }

    /// Replace the opener used by the `open_*` operations.
    pub fn with_opener(mut self, opener: OpenerHandle) -> Self {
        self.opener = opener;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<bucket_name(date_label)>`, without creating anything.
    ///
    /// # Errors
    ///
    /// [`InvalidDateLabel`](ErrorKind::InvalidDateLabel) if the label is empty
    /// or only whitespace, which would otherwise address `root` itself.
    pub fn date_dir(&self, date_label: &str) -> Result<PathBuf> {
        let name = bucket_name(date_label);
        if name.is_empty() {
            exn::bail!(ErrorKind::InvalidDateLabel(date_label.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// `<root>/<bucket_name(date_label)>/files`, created on first use.
    pub fn bucket_dir(&self, date_label: &str) -> Result<PathBuf> {
        let dir = self.date_dir(date_label)?.join(FILES_DIR);
        fs::create_dir_all(&dir).map_err(|e| ErrorKind::from_io(e, &dir))?;
        Ok(dir)
    }

    /// Path a stored file called `filename` has (or would have) in the bucket.
    ///
    /// # Errors
    ///
    /// [`InvalidPath`](ErrorKind::InvalidPath) unless `filename` is a single
    /// plain name; see [`validate_file_name`](crate::validate_file_name).
    pub fn attachment_path(&self, date_label: &str, filename: impl AsRef<Path>) -> Result<PathBuf> {
        let name = validate_file_name(filename.as_ref())?;
        Ok(self.bucket_dir(date_label)?.join(name))
    }

    /// Copy every existing regular file in `sources` into the bucket.
    ///
    /// Modification times (and access times where readable) are carried over.
    /// Sources that are missing or not regular files are skipped without
    /// comment. Returns the created destinations in source order.
    ///
    /// # Errors
    ///
    /// The first failed copy aborts the batch. Files copied before it stay.
    #[instrument(level = "debug", skip(self, sources))]
    pub fn add_files<I, P>(&self, date_label: &str, sources: I) -> Result<Vec<PathBuf>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dir = self.bucket_dir(date_label)?;
        let mut added = Vec::new();
        for source in sources {
            let source = source.as_ref();
            if let Err(reason) = check_source(source) {
                tracing::debug!(source = %source.display(), %reason, "Skipping attachment source");
                continue;
            }
            added.push(copy_into(&dir, source)?);
        }
        Ok(added)
    }

    /// Like [`add_files`](Self::add_files), but accounts for every source and
    /// keeps going after a failed copy.
    ///
    /// # Errors
    ///
    /// Only if the bucket directory itself cannot be created.
    #[instrument(level = "debug", skip(self, sources))]
    pub fn add_files_detailed<I, P>(&self, date_label: &str, sources: I) -> Result<AddOutcome>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dir = self.bucket_dir(date_label)?;
        let mut outcome = AddOutcome::default();
        for source in sources {
            let source = source.as_ref();
            if let Err(reason) = check_source(source) {
                outcome.skipped.push(Skipped { source: source.to_path_buf(), reason });
                continue;
            }
            match copy_into(&dir, source) {
                Ok(dest) => outcome.added.push(dest),
                Err(error) => {
                    let kind: &ErrorKind = &error;
                    tracing::warn!(source = %source.display(), error = %kind, "Failed to copy attachment");
                    outcome.failed.push(Failed { source: source.to_path_buf(), error });
                },
            }
        }
        Ok(outcome)
    }

    /// Regular files directly inside the bucket, most recently modified first.
    ///
    /// Entries with equal modification times come out in no particular order.
    /// Subdirectories and dangling symlinks are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn list_files(&self, date_label: &str) -> Result<Vec<Attachment>> {
        let dir = self.bucket_dir(date_label)?;
        let entries = fs::read_dir(&dir).map_err(|e| ErrorKind::from_io(e, &dir))?;
        let mut attachments = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ErrorKind::from_io(e, &dir))?.path();
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                // Dangling symlink, or deleted since read_dir saw it.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ErrorKind::from_io(e, &path).into()),
            };
            if metadata.is_file() {
                attachments.push(Attachment::from_metadata(&path, &metadata)?);
            }
        }
        attachments.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(attachments)
    }

    /// Delete the named file from the bucket. Returns `false` instead of an
    /// error for anything that prevents it; use
    /// [`try_delete_file`](Self::try_delete_file) to find out what.
    pub fn delete_file(&self, date_label: &str, filename: impl AsRef<Path>) -> bool {
        let filename = filename.as_ref();
        match self.try_delete_file(date_label, filename) {
            Ok(()) => true,
            Err(err) => {
                let kind: &ErrorKind = &err;
                match kind {
                    ErrorKind::NotFound(_) => tracing::debug!(filename = %filename.display(), "Nothing to delete"),
                    _ => tracing::warn!(filename = %filename.display(), error = %kind, "Failed to delete attachment"),
                }
                false
            },
        }
    }

    /// Delete the named file from the bucket.
    ///
    /// # Errors
    ///
    /// - [`InvalidPath`](ErrorKind::InvalidPath) if `filename` is not a plain name
    /// - [`NotFound`](ErrorKind::NotFound) if nothing by that name exists
    /// - [`NotAFile`](ErrorKind::NotAFile) for directories and other non-files
    /// - [`PermissionDenied`](ErrorKind::PermissionDenied) or
    ///   [`Io`](ErrorKind::Io) if removal fails
    #[instrument(level = "debug", skip(self, filename), fields(filename = %filename.as_ref().display()))]
    pub fn try_delete_file(&self, date_label: &str, filename: impl AsRef<Path>) -> Result<()> {
        let path = self.attachment_path(date_label, filename)?;
        let metadata = fs::metadata(&path).map_err(|e| ErrorKind::from_io(e, &path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotAFile(path));
        }
        fs::remove_file(&path).map_err(|e| ErrorKind::from_io(e, &path))?;
        tracing::debug!(path = %path.display(), "Deleted attachment");
        Ok(())
    }

    /// Hand `path` to the default application. Failures are logged and
    /// otherwise ignored.
    pub fn open_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Err(err) = self.try_open_file(path) {
            let kind: &ErrorKind = &err;
            tracing::warn!(path = %path.display(), error = %kind, "Could not open file");
        }
    }

    pub fn try_open_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.opener.open(path.as_ref())
    }

    /// Open the bucket's `files` directory in the file manager, creating it if
    /// needed. Failures are logged and otherwise ignored.
    pub fn open_bucket_folder(&self, date_label: &str) {
        if let Err(err) = self.try_open_bucket_folder(date_label) {
            let kind: &ErrorKind = &err;
            tracing::warn!(date_label, error = %kind, "Could not open attachment folder");
        }
    }

    pub fn try_open_bucket_folder(&self, date_label: &str) -> Result<()> {
        let dir = self.bucket_dir(date_label)?;
        self.opener.open(&dir)
    }

    /// Open a stored file by name. Returns `false` without opening anything if
    /// no regular file by that name is in the bucket.
    pub fn open_attachment(&self, date_label: &str, filename: impl AsRef<Path>) -> bool {
        let filename = filename.as_ref();
        match self.attachment_path(date_label, filename) {
            Ok(path) if path.is_file() => {
                self.open_file(&path);
                true
            },
            Ok(_) => false,
            Err(err) => {
                let kind: &ErrorKind = &err;
                tracing::warn!(filename = %filename.display(), error = %kind, "Could not resolve attachment");
                false
            },
        }
    }

    /// Strict counterpart of [`open_attachment`](Self::open_attachment).
    pub fn try_open_attachment(&self, date_label: &str, filename: impl AsRef<Path>) -> Result<()> {
        let path = self.attachment_path(date_label, filename)?;
        let metadata = fs::metadata(&path).map_err(|e| ErrorKind::from_io(e, &path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotAFile(path));
        }
        self.opener.open(&path)
    }
}

fn check_source(source: &Path) -> std::result::Result<(), SkipReason> {
    match fs::metadata(source) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(SkipReason::NotAFile),
        Err(_) => Err(SkipReason::Missing),
    }
}

/// Copy `source` under a collision-free name in `dir`, carrying over its
/// timestamps and permissions.
fn copy_into(dir: &Path, source: &Path) -> Result<PathBuf> {
    let dest = unique_destination(dir, source)?;
    let mut reader = File::open(source).map_err(|e| ErrorKind::from_io(e, source))?;
    let metadata = reader.metadata().map_err(|e| ErrorKind::from_io(e, source))?;
    // `create_new` so a name taken since unique_destination looked fails
    // instead of being overwritten.
    let writer = File::options()
        .write(true)
        .create_new(true)
        .open(&dest)
        .map_err(|e| ErrorKind::from_io(e, &dest))?;
    if let Err(err) = fill(&mut reader, writer, source, &dest, &metadata) {
        // No half-finished records.
        if let Err(e) = fs::remove_file(&dest) {
            tracing::warn!(dest = %dest.display(), error = %e, "Failed to remove incomplete copy");
        }
        return Err(err);
    }
    tracing::debug!(source = %source.display(), dest = %dest.display(), bytes = metadata.len(), "Copied attachment");
    Ok(dest)
}

/// Contents, then timestamps, then permissions once the writer is closed.
fn fill(reader: &mut File, mut writer: File, source: &Path, dest: &Path, metadata: &Metadata) -> Result<()> {
    io::copy(reader, &mut writer).map_err(|e| ErrorKind::from_io(e, source))?;
    let mut times = FileTimes::new().set_modified(metadata.modified().map_err(|e| ErrorKind::from_io(e, source))?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    writer.set_times(times).map_err(|e| ErrorKind::from_io(e, dest))?;
    drop(writer);
    fs::set_permissions(dest, metadata.permissions()).map_err(|e| ErrorKind::from_io(e, dest))?;
    Ok(())
}
