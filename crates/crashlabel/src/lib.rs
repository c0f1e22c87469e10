//! # crashlabel
//!
//! Host integration for the crash log labeler.
//!
//! A host application (typically a mod manager) embeds the labeler and calls
//! into it at two points:
//!
//! - when the game is known: [`CrashLogLabeler::on_initialized`]
//! - after every game run: [`CrashLogLabeler::on_run_finished`]
//!
//! Everything else is explicit configuration handed over at start-up: the
//! [`GameTable`] of supported games, [`LabelerSettings`], a [`Trash`] for the
//! originals of rewritten logs and, optionally, a [`DatabaseUpdater`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use crashlabel::{CrashLogLabeler, GameTable, KeepOriginal, LabelerSettings};
//!
//! fn main() -> crashlabel::Result<()>
//! {
//!     let (_log_file, _guard) = crashlabel::init_logging_for_host(None).expect("logging");
//!
//!     let mut table = GameTable::builtin(Path::new("C:/Users/dovah/Documents"))?;
//!     table.set_database("Skyrim Special Edition", "C:/crashlabel/skyrimse/database.txt")?;
//!
//!     let mut labeler = CrashLogLabeler::new(table, LabelerSettings::default(), KeepOriginal, None);
//!     labeler.on_initialized("Skyrim Special Edition")?;
//!     // ... the game runs ...
//!     let report = labeler.on_run_finished(0)?;
//!     println!("{} new logs labeled", report.rewritten);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod finder;
pub mod labeler;

pub use config::{GameProfile, GameTable, LabelerSettings};
// Re-export commonly used types
pub use crashlabel_core::{KeepOriginal, MoveToDirectory, ProcessOutcome, Trash};
pub use crashlabel_utils::{init_logging, init_logging_for_host, LogLevel, LoggingGuard};
pub use error::{LabelerError, Result};
pub use finder::CrashLogFinder;
pub use labeler::{CrashLogLabeler, DatabaseUpdater, RunReport};
