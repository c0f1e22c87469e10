//! # Error Types
//!
//! Errors raised while driving the labeler from a host.

use std::io;

use crashlabel_core::CrashLabelError;
use thiserror::Error;

/// Error type for host integration
#[derive(Error, Debug)]
pub enum LabelerError
{
    /// Processing a crash log failed
    #[error(transparent)]
    Core(#[from] CrashLabelError),

    /// A crash log filter is not a valid glob pattern
    #[error("Invalid crash log filter: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The external database updater reported a failure
    ///
    /// Not fatal: processing continues with the local, possibly stale, copy.
    #[error("Symbol database update failed: {0}")]
    DatabaseSync(String),

    /// No profile is registered for the requested game
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    /// I/O error while listing crash logs or reading settings
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience type alias for `Result<T, LabelerError>`
pub type Result<T> = std::result::Result<T, LabelerError>;

#[cfg(test)]
mod tests
{
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_core_errors_display_transparently()
    {
        let core = CrashLabelError::CorruptDatabase {
            path: PathBuf::from("database.txt"),
            line: 7,
            reason: "expected `<id> <name>`".to_string(),
        };
        let expected = core.to_string();
        let error: LabelerError = core.into();
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_pattern_error_conversion()
    {
        let error: LabelerError = glob::Pattern::new("crash-[.log").unwrap_err().into();
        assert!(matches!(error, LabelerError::Pattern(_)));
        assert!(error.to_string().starts_with("Invalid crash log filter"));
    }

    #[test]
    fn test_unknown_game_display()
    {
        assert_eq!(LabelerError::UnknownGame("Oblivion".to_string()).to_string(), "Unknown game: Oblivion");
    }
}
