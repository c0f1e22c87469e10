//! # Logging Utilities
//!
//! Logging infrastructure for crashlabel using `tracing`.
//!
//! The labeler normally runs inside a host application (a mod manager) that
//! owns the console, so two set-ups are offered:
//! - console logging (plus an optional file) for tools and tests
//! - file-only logging for embedding in a host
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crashlabel_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Labeler started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=crashlabel_core=debug`)
//! - `CRASHLABEL_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `CRASHLABEL_LOG_FILE`: Optional path to an additional, daily-rolled log file

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Local;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "CRASHLABEL_LOG_FORMAT";

/// Environment variable naming an additional log file.
pub const LOG_FILE_ENV: &str = "CRASHLABEL_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Keeps background log writers alive.
///
/// Dropping the guard flushes and stops file logging; hold it for as long as
/// the labeler runs.
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize console logging with settings from the environment
///
/// - `RUST_LOG`: level filter (default `info`)
/// - `CRASHLABEL_LOG_FORMAT`: `json` or `pretty` (default `pretty`; unknown values fall back to it)
/// - `CRASHLABEL_LOG_FILE`: optional additional log file
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    let format = env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Pretty);

    init_console(format, None)
}

/// Initialize console logging with an explicit level and format
///
/// The explicit level takes precedence over `RUST_LOG`.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_console(format, Some(level.into()))
}

/// Initialize file-only logging for use inside a host application
///
/// Nothing is written to stdout or stderr. The log goes to
/// `~/.crashlabel/YYYY-MM-DD-crashlabel.log`, or to the system temporary
/// directory if there is no home directory.
///
/// ## Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_logging_for_host(level: Option<LogLevel>) -> Result<(PathBuf, LoggingGuard), LoggingError>
{
    let home = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE"));
    let log_file = host_log_path(home.as_deref().map(Path::new), &env::temp_dir());
    if let Some(dir) = log_file.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let filter = build_filter(level.map(Into::into));
    let (writer, guard) = tracing_appender::non_blocking(file_appender(&log_file, false)?);
    let layer = format_layer(LogFormat::Pretty, writer, false).with_filter(filter);
    Registry::default()
        .with(layer)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok((log_file, LoggingGuard { _file: Some(guard) }))
}

/// Dated log file location used by [`init_logging_for_host`].
pub fn host_log_path(home: Option<&Path>, fallback: &Path) -> PathBuf
{
    let file_name = format!("{}-crashlabel.log", Local::now().format("%Y-%m-%d"));
    match home {
        Some(home) => home.join(".crashlabel").join(file_name),
        None => fallback.join(file_name),
    }
}

/// Filter priority: explicit level, then `RUST_LOG`, then `info`.
fn build_filter(explicit_level: Option<Level>) -> EnvFilter
{
    if let Some(level) = explicit_level {
        return EnvFilter::new(level.to_string());
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
}

fn file_appender(path: &Path, rolling_daily: bool) -> Result<RollingFileAppender, LoggingError>
{
    let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    Ok(if rolling_daily {
        tracing_appender::rolling::daily(dir, file_name)
    } else {
        // The file name already carries the date.
        tracing_appender::rolling::never(dir, file_name)
    })
}

fn format_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(ansi);

    match format {
        LogFormat::Pretty => layer.boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_span_list(true).boxed(),
    }
}

fn init_console(format: LogFormat, explicit_level: Option<Level>) -> Result<LoggingGuard, LoggingError>
{
    let filter = build_filter(explicit_level);
    let console = format_layer(format, io::stdout, true).with_filter(filter.clone());

    let mut guard = LoggingGuard::default();
    let file_layer = match env::var_os(LOG_FILE_ENV) {
        Some(path) => {
            let (writer, file_guard) = tracing_appender::non_blocking(file_appender(Path::new(&path), true)?);
            guard._file = Some(file_guard);
            Some(format_layer(format, writer, false).with_filter(filter))
        }
        None => None,
    };

    Registry::default()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(guard)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Log file path has no file name
    #[error("Invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("text").unwrap(), LogFormat::Pretty);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_host_log_path()
    {
        let with_home = host_log_path(Some(Path::new("/home/dovah")), Path::new("/tmp"));
        assert!(with_home.starts_with("/home/dovah/.crashlabel"));
        assert!(with_home.to_string_lossy().ends_with("-crashlabel.log"));

        let without_home = host_log_path(None, Path::new("/tmp"));
        assert_eq!(without_home.parent(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_file_appender_rejects_directory_path()
    {
        assert!(matches!(file_appender(Path::new("/"), false), Err(LoggingError::InvalidPath(_))));
    }
}
