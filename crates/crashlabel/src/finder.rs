//! # Crash Log Finder
//!
//! Locates the crash logs a game has written.
//!
//! Logs live in a per-game default directory, but the crash logger can be told
//! to write elsewhere through its `CrashLogger.ini`:
//!
//! ```ini
//! [Debug]
//! Crashlog Directory = D:\Logs\Skyrim
//! ```
//!
//! A configured directory wins only if it exists; otherwise the default is used.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::Result;

/// INI section holding the crash log directory override.
const INI_SECTION: &str = "Debug";

/// INI option naming the crash log directory.
const INI_DIRECTORY_KEY: &str = "Crashlog Directory";

/// Finds crash logs in a directory by file name pattern.
#[derive(Debug, Clone)]
pub struct CrashLogFinder
{
    log_directory: PathBuf,
    filter: Pattern,
}

impl CrashLogFinder
{
    /// Create a finder for files matching `filter` (e.g. `crash-*.log`) in `log_directory`.
    ///
    /// ## Errors
    ///
    /// Returns an error if `filter` is not a valid glob pattern.
    pub fn new(log_directory: impl Into<PathBuf>, filter: &str) -> Result<Self>
    {
        Ok(Self {
            log_directory: log_directory.into(),
            filter: Pattern::new(filter)?,
        })
    }

    /// Default log directory.
    pub fn log_directory(&self) -> &Path
    {
        &self.log_directory
    }

    /// File name pattern.
    pub fn filter(&self) -> &str
    {
        self.filter.as_str()
    }

    /// Directory the crash logger writes to.
    ///
    /// Reads the `[Debug]` `Crashlog Directory` option from `ini` when given.
    /// Falls back to [`log_directory`](Self::log_directory) if the file is
    /// unreadable, the option is missing or empty, or the directory does not
    /// exist.
    pub fn crash_log_dir(&self, ini: Option<&Path>) -> PathBuf
    {
        let configured = ini.and_then(|path| match fs::read_to_string(path) {
            Ok(text) => ini_value(&text, INI_SECTION, INI_DIRECTORY_KEY),
            Err(err) => {
                debug!("Cannot read {}: {err}", path.display());
                None
            }
        });

        match configured.map(PathBuf::from) {
            Some(dir) if dir.is_dir() => dir,
            Some(dir) => {
                debug!("Configured crash log directory {} does not exist", dir.display());
                self.log_directory.clone()
            }
            None => self.log_directory.clone(),
        }
    }

    /// All crash logs currently on disk.
    ///
    /// A missing directory yields an empty set.
    ///
    /// ## Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn crash_logs(&self, ini: Option<&Path>) -> Result<BTreeSet<PathBuf>>
    {
        let dir = self.crash_log_dir(ini);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(err) => return Err(err.into()),
        };

        let mut logs = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            let matches = entry.file_name().to_str().is_some_and(|name| self.filter.matches(name));
            if matches && entry.file_type()?.is_file() {
                logs.insert(entry.path());
            }
        }
        Ok(logs)
    }
}

/// Look up `key` in `[section]` of INI text.
///
/// Section names are case-sensitive and option names are not. `=` and `:`
/// both separate names from values; lines starting with `#` or `;` are
/// comments. Empty values count as missing.
fn ini_value(text: &str, section: &str, key: &str) -> Option<String>
{
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut in_section = false;
    let mut found = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            in_section = name.trim() == section;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some(split) = line.find(['=', ':']) else {
            continue;
        };
        let (name, value) = (line[..split].trim(), line[split + 1..].trim());
        if name.eq_ignore_ascii_case(key) {
            // Later duplicates win.
            found = Some(value.to_string());
        }
    }

    found.filter(|value| !value.is_empty())
}
