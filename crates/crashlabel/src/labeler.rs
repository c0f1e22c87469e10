//! # Labeler Lifecycle
//!
//! The host drives the labeler through two entry points:
//!
//! - [`CrashLogLabeler::on_initialized`] once the game is known. Every crash
//!   log already on disk is labeled.
//! - [`CrashLogLabeler::on_run_finished`] after each game run. Only logs that
//!   appeared since the last pass are labeled.
//!
//! Unless running offline, the game's symbol database is brought up to date
//! through the [`DatabaseUpdater`] when the game is selected and again before
//! any later pass that has new logs to label.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crashlabel_core::{CrashLogProcessor, ProcessOutcome, Trash};
use tracing::{debug, info, warn};

use crate::config::{GameTable, LabelerSettings};
use crate::error::Result;
use crate::finder::CrashLogFinder;

/// Brings a game's symbol database up to date.
pub trait DatabaseUpdater
{
    /// Refresh the database for `game` stored at `database`.
    ///
    /// ## Errors
    ///
    /// A failure is logged and the stale database is used.
    fn update(&self, game: &str, database: &Path) -> Result<()>;
}

impl<F> DatabaseUpdater for F
where
    F: Fn(&str, &Path) -> Result<()>,
{
    fn update(&self, game: &str, database: &Path) -> Result<()>
    {
        self(game, database)
    }
}

/// Counts from one labeling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport
{
    /// Logs looked at, whatever the outcome.
    pub processed: usize,
    /// Logs replaced with a labeled copy.
    pub rewritten: usize,
    /// Logs that could not be processed.
    pub failed: usize,
}

impl RunReport
{
    fn record(&mut self, outcome: &crashlabel_core::Result<ProcessOutcome>)
    {
        self.processed += 1;
        match outcome {
            Ok(outcome) if outcome.is_modified() => self.rewritten += 1,
            Ok(_) => {}
            Err(_) => self.failed += 1,
        }
    }
}

/// State of the selected game.
struct ActiveGame
{
    name: String,
    finder: CrashLogFinder,
    processor: CrashLogProcessor,
    processed: BTreeSet<PathBuf>,
}

/// Labels the crash logs of whichever game the host runs.
pub struct CrashLogLabeler
{
    table: GameTable,
    settings: LabelerSettings,
    trash: Arc<dyn Trash + Send + Sync>,
    updater: Option<Box<dyn DatabaseUpdater + Send + Sync>>,
    ini: Option<PathBuf>,
    active: Option<ActiveGame>,
}

impl std::fmt::Debug for CrashLogLabeler
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("CrashLogLabeler")
            .field("settings", &self.settings)
            .field("ini", &self.ini)
            .field("game", &self.game())
            .finish_non_exhaustive()
    }
}

impl CrashLogLabeler
{
    /// Create an inactive labeler.
    pub fn new(
        table: GameTable,
        settings: LabelerSettings,
        trash: impl Trash + Send + Sync + 'static,
        updater: Option<Box<dyn DatabaseUpdater + Send + Sync>>,
    ) -> Self
    {
        Self {
            table,
            settings,
            trash: Arc::new(trash),
            updater,
            ini: None,
            active: None,
        }
    }

    /// Read the crash log directory override from this `CrashLogger.ini`.
    #[must_use]
    pub fn with_crash_logger_ini(mut self, ini: impl Into<PathBuf>) -> Self
    {
        self.ini = Some(ini.into());
        self
    }

    /// Configured games.
    pub fn table(&self) -> &GameTable
    {
        &self.table
    }

    /// Name of the selected game, if it is supported.
    pub fn game(&self) -> Option<&str>
    {
        self.active.as_ref().map(|active| active.name.as_str())
    }

    /// Select `game`, update its database and label every crash log it has
    /// written so far.
    ///
    /// A game without a profile or without a database leaves the labeler
    /// inactive and yields an empty report.
    ///
    /// ## Errors
    ///
    /// Returns an error if the crash log directory cannot be listed; the game
    /// is still selected. Failures on individual logs are only counted.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_initialized(&mut self, game: &str) -> Result<RunReport>
    {
        self.active = None;

        let Some(profile) = self.table.get(game) else {
            debug!("Game {game} is not supported");
            return Ok(RunReport::default());
        };
        let Some(database) = profile.database.clone() else {
            debug!("No symbol database configured for {game}");
            return Ok(RunReport::default());
        };

        let trash = Arc::clone(&self.trash);
        let processor = CrashLogProcessor::new(database, move |path: &Path| -> io::Result<()> { trash.trash(path) });
        let mut active = ActiveGame {
            name: game.to_string(),
            finder: profile.finder.clone(),
            processor,
            processed: BTreeSet::new(),
        };

        self.update_database(game, active.processor.database());
        // The game stays selected even if listing fails, so later runs pick
        // up every log not yet seen.
        let result = active
            .finder
            .crash_logs(self.ini.as_deref())
            .map(|logs| self.label(&mut active, &logs));
        self.active = Some(active);
        result
    }

    /// Label the crash logs written since the last pass.
    ///
    /// Nothing happens, and the database is not updated, when no new log has
    /// appeared or no game is selected.
    ///
    /// ## Errors
    ///
    /// Returns an error if the crash log directory cannot be listed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_run_finished(&mut self, exit_code: i32) -> Result<RunReport>
    {
        let Some(mut active) = self.active.take() else {
            return Ok(RunReport::default());
        };
        debug!("{} exited with code {exit_code}", active.name);

        let result = active.finder.crash_logs(self.ini.as_deref()).map(|logs| {
            let fresh: BTreeSet<PathBuf> = logs.difference(&active.processed).cloned().collect();
            if fresh.is_empty() {
                debug!("No new crash logs");
                return RunReport::default();
            }
            self.update_database(&active.name, active.processor.database());
            self.label(&mut active, &fresh)
        });
        self.active = Some(active);
        result
    }

    fn label(&self, active: &mut ActiveGame, logs: &BTreeSet<PathBuf>) -> RunReport
    {
        let mut report = RunReport::default();
        for (path, outcome) in active.processor.process_logs(logs) {
            report.record(&outcome);
            active.processed.insert(path);
        }

        info!(
            "{}: {} crash logs, {} labeled, {} failed",
            active.name, report.processed, report.rewritten, report.failed
        );
        report
    }

    fn update_database(&self, game: &str, database: &Path)
    {
        if self.settings.offline_mode {
            debug!("Offline; using the database as is");
            return;
        }
        let Some(updater) = &self.updater else {
            return;
        };
        if let Err(err) = updater.update(game, database) {
            warn!("Could not update the {game} symbol database: {err}");
        }
    }
}
