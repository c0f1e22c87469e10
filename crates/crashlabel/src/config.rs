//! # Configuration
//!
//! Per-game configuration, passed to the labeler at start-up.
//!
//! A game is supported once it has both a crash log finder and a symbol
//! database location. [`GameTable::builtin`] knows where the supported titles
//! write their crash logs; database locations come from whoever keeps the
//! databases in sync.
//!
//! ```rust
//! use std::path::Path;
//!
//! use crashlabel::config::GameTable;
//!
//! let mut table = GameTable::builtin(Path::new("/home/dovah/Documents")).unwrap();
//! assert!(table.supported_games().is_empty());
//!
//! table.set_database("Skyrim Special Edition", "/data/skyrimse/database.txt").unwrap();
//! assert_eq!(table.supported_games(), vec!["Skyrim Special Edition"]);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{LabelerError, Result};
use crate::finder::CrashLogFinder;

/// Skyrim Special Edition / Anniversary Edition.
pub const SKYRIM_SE: &str = "Skyrim Special Edition";

/// Skyrim VR.
pub const SKYRIM_VR: &str = "Skyrim VR";

/// File name pattern the crash logger uses.
pub const CRASH_LOG_FILTER: &str = "crash-*.log";

/// Everything the labeler needs to know about one game.
#[derive(Debug, Clone)]
pub struct GameProfile
{
    /// Where the game's crash logs are.
    pub finder: CrashLogFinder,
    /// Local copy of the game's symbol database, if one is configured.
    pub database: Option<PathBuf>,
}

impl GameProfile
{
    /// Profile without a database.
    pub fn new(finder: CrashLogFinder) -> Self
    {
        Self { finder, database: None }
    }
}

/// Game profiles keyed by game name, as reported by the host.
#[derive(Debug, Clone, Default)]
pub struct GameTable
{
    profiles: BTreeMap<String, GameProfile>,
}

impl GameTable
{
    /// Empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Profiles for the known titles, with logs under `documents_dir`.
    ///
    /// Logs are expected in `<documents>/My Games/<title>/SKSE`. No database
    /// is set.
    ///
    /// ## Errors
    ///
    /// Only fails if the built-in filter is not a valid pattern.
    pub fn builtin(documents_dir: &Path) -> Result<Self>
    {
        let mut table = Self::new();
        for game in [SKYRIM_SE, SKYRIM_VR] {
            let log_directory = documents_dir.join("My Games").join(game).join("SKSE");
            table.insert(game, GameProfile::new(CrashLogFinder::new(log_directory, CRASH_LOG_FILTER)?));
        }
        Ok(table)
    }

    /// Register or replace the profile for `game`.
    pub fn insert(&mut self, game: impl Into<String>, profile: GameProfile)
    {
        self.profiles.insert(game.into(), profile);
    }

    /// Set the symbol database location for a registered game.
    ///
    /// ## Errors
    ///
    /// Returns [`LabelerError::UnknownGame`] if `game` has no profile.
    pub fn set_database(&mut self, game: &str, database: impl Into<PathBuf>) -> Result<()>
    {
        let profile = self
            .profiles
            .get_mut(game)
            .ok_or_else(|| LabelerError::UnknownGame(game.to_string()))?;
        profile.database = Some(database.into());
        Ok(())
    }

    /// Profile for `game`, if registered.
    pub fn get(&self, game: &str) -> Option<&GameProfile>
    {
        self.profiles.get(game)
    }

    /// Games that have both a finder and a database, in name order.
    pub fn supported_games(&self) -> Vec<&str>
    {
        self.profiles
            .iter()
            .filter(|(_, profile)| profile.database.is_some())
            .map(|(game, _)| game.as_str())
            .collect()
    }
}

/// User-facing switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelerSettings
{
    /// Use the local databases as they are, without asking the updater.
    pub offline_mode: bool,
}

impl Default for LabelerSettings
{
    fn default() -> Self
    {
        Self { offline_mode: true }
    }
}
