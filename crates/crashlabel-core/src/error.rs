//! # Error Types
//!
//! Error handling for crash log labeling.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Most "nothing to do" situations are *not* errors: a log without a call
//! stack, a call stack without recognizable frames, or a missing symbol
//! database all degrade to an unmodified log (see
//! [`ProcessOutcome`](crate::processor::ProcessOutcome)). The variants below
//! are reserved for conditions that stop processing of a single log.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for crash log operations
///
/// ## Error Categories
///
/// 1. **Filesystem errors**: Io, Persist, Trash
/// 2. **Data errors**: CorruptDatabase
#[derive(Error, Debug)]
pub enum CrashLabelError
{
    /// A line in the symbol database could not be parsed
    ///
    /// The database is an externally synchronized asset, so a bad line means the
    /// local copy is damaged. The resolution pass for the current log is
    /// abandoned; other logs are unaffected.
    #[error("Corrupt symbol database {}: line {line}: {reason}", .path.display())]
    CorruptDatabase
    {
        /// Database file being scanned
        path: PathBuf,
        /// 1-based line number (the header is line 1)
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// The rewritten log could not be moved over the original
    ///
    /// The original file is left in place when this happens.
    #[error("Failed to replace {}: {source}", .path.display())]
    Persist
    {
        /// Log that was being replaced
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The trash collaborator refused to dispose of the original log
    #[error("Failed to trash {}: {source}", .path.display())]
    Trash
    {
        /// Log that was being trashed
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// I/O error while reading a log or the database
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience type alias for `Result<T, CrashLabelError>`
///
/// ```rust
/// use crashlabel_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, CrashLabelError>;
