//! # Log Processing
//!
//! Ties the crash log model and the resolver together for one log file:
//!
//! 1. Parse the log.
//! 2. Collect the distinct frame ids and the column width.
//! 3. Resolve the ids against the symbol database.
//! 4. Rewrite the call stack and, if anything changed, replace the file.
//!
//! If the call stack has no frames, or *none* of its ids resolve, the file is
//! left alone. Once a single id resolves every frame is rewritten, with
//! unresolved frames reduced to their frame text.
//!
//! ## Replacement
//!
//! The new content goes to a temporary file next to the log first, with the
//! log's permissions. Only after it is fully written is the [`Trash`]
//! collaborator given the original, and then the temporary file is renamed
//! over the original path. The temporary file is removed on any failure.
//!
//! Up to and including the trash step, a failure leaves the original at its
//! path. Once the trash has taken the original, it is the trash's copy: if the
//! final rename then fails, the log path may be empty and the original is
//! wherever the trash put it.

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::document::CrashLogDocument;
use crate::error::{CrashLabelError, Result};
use crate::resolver::{collect_ids, resolve, rewrite_line};

/// Disposes of an original log before its rewritten copy takes its place.
///
/// Hosts typically move the original to the system trash so the user can
/// recover it.
pub trait Trash
{
    /// Dispose of the file at `path`.
    ///
    /// ## Errors
    ///
    /// An error aborts the replacement; the rewritten copy is discarded.
    fn trash(&self, path: &Path) -> io::Result<()>;
}

impl<F> Trash for F
where
    F: Fn(&Path) -> io::Result<()>,
{
    fn trash(&self, path: &Path) -> io::Result<()>
    {
        self(path)
    }
}

/// Leaves the original alone; the atomic rename overwrites it.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOriginal;

impl Trash for KeepOriginal
{
    fn trash(&self, _path: &Path) -> io::Result<()>
    {
        Ok(())
    }
}

/// Moves originals into a directory, keeping every version.
///
/// A file that already exists in the directory is not overwritten; the moved
/// file gets a numeric suffix instead (`crash-1.log`, `crash-1.1.log`, ...).
#[derive(Debug, Clone)]
pub struct MoveToDirectory
{
    dir: PathBuf,
}

impl MoveToDirectory
{
    /// Move originals into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self
    {
        Self { dir: dir.into() }
    }

    /// Directory originals are moved into.
    pub fn dir(&self) -> &Path
    {
        &self.dir
    }

    fn free_destination(&self, path: &Path) -> io::Result<PathBuf>
    {
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("{} has no file name", path.display())))?;
        let candidate = self.dir.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let stem = path.file_stem().unwrap_or(file_name).to_string_lossy();
        let extension = path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default();
        (1u32..)
            .map(|n| self.dir.join(format!("{stem}.{n}{extension}")))
            .find(|candidate| !candidate.exists())
            .ok_or_else(|| io::Error::new(io::ErrorKind::AlreadyExists, "no free trash slot"))
    }
}

impl Trash for MoveToDirectory
{
    fn trash(&self, path: &Path) -> io::Result<()>
    {
        fs::create_dir_all(&self.dir)?;
        let destination = self.free_destination(path)?;
        match fs::rename(path, &destination) {
            Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
                fs::copy(path, &destination)?;
                fs::remove_file(path)
            }
            result => result,
        }
    }
}

/// What happened to a processed log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome
{
    /// The log has no call stack lines.
    NoCallStack,
    /// The call stack has no frame carrying an address id.
    NoFrames,
    /// None of the ids is in the database, or there is no usable database.
    NoSymbols,
    /// Names were found but the rewritten call stack is identical.
    Unchanged,
    /// The log was rewritten with symbol names.
    Rewritten,
}

impl ProcessOutcome
{
    /// `true` if the log file on disk was replaced.
    pub fn is_modified(self) -> bool
    {
        self == ProcessOutcome::Rewritten
    }
}

/// Labels crash logs using one symbol database.
///
/// The processor holds no per-log state: each call to
/// [`process_log`](Self::process_log) opens its own document and scanner, so
/// independent logs never affect each other.
pub struct CrashLogProcessor
{
    database: PathBuf,
    trash: Box<dyn Trash + Send + Sync>,
}

impl std::fmt::Debug for CrashLogProcessor
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("CrashLogProcessor").field("database", &self.database).finish_non_exhaustive()
    }
}

impl CrashLogProcessor
{
    /// Create a processor for the database at `database`.
    ///
    /// The database may be missing; logs are then left untouched.
    pub fn new(database: impl Into<PathBuf>, trash: impl Trash + Send + Sync + 'static) -> Self
    {
        Self {
            database: database.into(),
            trash: Box::new(trash),
        }
    }

    /// Path of the symbol database.
    pub fn database(&self) -> &Path
    {
        &self.database
    }

    /// Label the crash log at `path` in place.
    ///
    /// ## Errors
    ///
    /// Returns an error if the log cannot be read or replaced, if the trash
    /// collaborator fails, or if the database is corrupt. The original stays at
    /// `path` unless the trash already took it; only a [`CrashLabelError::Persist`]
    /// error can follow a successful trash step.
    #[tracing::instrument(level = "debug", skip(self), fields(database = %self.database.display()))]
    pub fn process_log(&self, path: &Path) -> Result<ProcessOutcome>
    {
        let mut document = CrashLogDocument::read(path)?;
        if document.call_stack().is_empty() {
            debug!("No call stack");
            return Ok(ProcessOutcome::NoCallStack);
        }

        let scan = collect_ids(&document);
        if scan.is_empty() {
            debug!("No address ids in call stack");
            return Ok(ProcessOutcome::NoFrames);
        }

        let table = resolve(&self.database, &scan.ids)?;
        if table.is_empty() {
            debug!("None of {} address ids resolved", scan.ids.len());
            return Ok(ProcessOutcome::NoSymbols);
        }

        document.rewrite_call_stack(|line| rewrite_line(line, &table, scan.width));
        if !document.changed() {
            return Ok(ProcessOutcome::Unchanged);
        }

        self.replace(path, &document)?;
        info!("Labeled {} of {} address ids in {}", table.len(), scan.ids.len(), path.display());
        Ok(ProcessOutcome::Rewritten)
    }

    /// Process several logs one after another.
    ///
    /// A failure is logged and reported for its log only; the remaining logs
    /// are still processed.
    pub fn process_logs<I, P>(&self, paths: I) -> Vec<(PathBuf, Result<ProcessOutcome>)>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref().to_path_buf();
                let outcome = self.process_log(&path);
                if let Err(err) = &outcome {
                    warn!("Failed to label {}: {err}", path.display());
                }
                (path, outcome)
            })
            .collect()
    }

    fn replace(&self, path: &Path, document: &CrashLogDocument) -> Result<()>
    {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let staged = tempfile::Builder::new()
            .prefix(".crashlabel-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        write_staged(&staged, document)?;
        staged.as_file().set_permissions(fs::metadata(path)?.permissions())?;

        self.trash.trash(path).map_err(|source| CrashLabelError::Trash {
            path: path.to_path_buf(),
            source,
        })?;

        staged.persist(path).map_err(|err| CrashLabelError::Persist {
            path: path.to_path_buf(),
            source: err.error,
        })?;
        Ok(())
    }
}

fn write_staged(staged: &NamedTempFile, document: &CrashLogDocument) -> io::Result<()>
{
    document.write_to(BufWriter::new(staged.as_file()))?;
    staged.as_file().sync_all()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_outcome_is_modified()
    {
        assert!(ProcessOutcome::Rewritten.is_modified());
        assert!(!ProcessOutcome::NoSymbols.is_modified());
        assert!(!ProcessOutcome::Unchanged.is_modified());
    }

    #[test]
    fn test_move_to_directory_keeps_every_version()
    {
        let dir = tempfile::tempdir().unwrap();
        let trash = MoveToDirectory::new(dir.path().join("trash"));

        for content in ["first", "second"] {
            let log = dir.path().join("crash-1.log");
            fs::write(&log, content).unwrap();
            trash.trash(&log).unwrap();
            assert!(!log.exists());
        }

        assert_eq!(fs::read_to_string(trash.dir().join("crash-1.log")).unwrap(), "first");
        assert_eq!(fs::read_to_string(trash.dir().join("crash-1.1.log")).unwrap(), "second");
    }

    #[test]
    fn test_move_to_directory_reports_missing_original()
    {
        let dir = tempfile::tempdir().unwrap();
        let trash = MoveToDirectory::new(dir.path().join("trash"));

        let err = trash.trash(&dir.path().join("absent.log")).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(fs::read_dir(trash.dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_closure_trash()
    {
        let trash = |path: &Path| -> io::Result<()> { fs::remove_file(path) };
        let file = NamedTempFile::new().unwrap();
        let (_, path) = file.keep().unwrap();
        trash.trash(&path).unwrap();
        assert!(!path.exists());
    }
}
