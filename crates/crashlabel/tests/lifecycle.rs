//! Tests for the host-facing labeler lifecycle

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crashlabel::config::{SKYRIM_SE, SKYRIM_VR};
use crashlabel::{
    CrashLogLabeler, DatabaseUpdater, GameTable, KeepOriginal, LabelerError, LabelerSettings, RunReport,
};
use tempfile::TempDir;

const DATABASE: &str = "id name\n12345 SomeFunction_\n";

const LOG: &str = "Skyrim SSE v1.6.640\n\
\n\
PROBABLE CALL STACK:\n\
\t[  0] 0x00007FF6ABCDEF00 SkyrimSE.exe+01ABCDEF -> 12345+0x10\n\
\n\
REGISTERS:\n";

const LABELED: &str = "Skyrim SSE v1.6.640\n\
\n\
PROBABLE CALL STACK:\n\
\t[  0] 0x00007FF6ABCDEF00 SkyrimSE.exe+01ABCDEF SomeFunction\n\
\n\
REGISTERS:\n";

struct Host
{
    _dir: TempDir,
    logs: PathBuf,
    table: GameTable,
    updates: Arc<AtomicUsize>,
}

impl Host
{
    /// Skyrim SE with a database and an empty log directory.
    fn new() -> Self
    {
        let dir = tempfile::tempdir().unwrap();
        let mut table = GameTable::builtin(dir.path()).unwrap();
        let logs = table.get(SKYRIM_SE).unwrap().finder.log_directory().to_path_buf();
        fs::create_dir_all(&logs).unwrap();

        let database = dir.path().join("database.txt");
        fs::write(&database, DATABASE).unwrap();
        table.set_database(SKYRIM_SE, &database).unwrap();

        Self {
            _dir: dir,
            logs,
            table,
            updates: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn write_log(&self, name: &str) -> PathBuf
    {
        let path = self.logs.join(name);
        fs::write(&path, LOG).unwrap();
        path
    }

    fn updater(&self, fail: bool) -> Box<dyn DatabaseUpdater + Send + Sync>
    {
        let updates = Arc::clone(&self.updates);
        Box::new(move |_game: &str, _database: &Path| -> crashlabel::Result<()> {
            updates.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(LabelerError::DatabaseSync("remote unreachable".to_string()))
            } else {
                Ok(())
            }
        })
    }

    fn labeler(&self, offline_mode: bool, failing_updater: bool) -> CrashLogLabeler
    {
        CrashLogLabeler::new(
            self.table.clone(),
            LabelerSettings { offline_mode },
            KeepOriginal,
            Some(self.updater(failing_updater)),
        )
    }

    fn updates(&self) -> usize
    {
        self.updates.load(Ordering::SeqCst)
    }
}

#[test]
fn test_unknown_game_stays_inactive()
{
    let host = Host::new();
    let log = host.write_log("crash-1.log");
    let mut labeler = host.labeler(false, false);

    assert_eq!(labeler.on_initialized("Oblivion").unwrap(), RunReport::default());
    assert_eq!(labeler.game(), None);
    assert_eq!(labeler.on_run_finished(0).unwrap(), RunReport::default());
    assert_eq!(fs::read_to_string(log).unwrap(), LOG);
    assert_eq!(host.updates(), 0);
}

#[test]
fn test_game_without_database_stays_inactive()
{
    let host = Host::new();
    let mut labeler = host.labeler(false, false);

    assert_eq!(labeler.on_initialized(SKYRIM_VR).unwrap(), RunReport::default());
    assert_eq!(labeler.game(), None);
    assert_eq!(host.updates(), 0);
}

#[test]
fn test_initialization_labels_existing_logs()
{
    let host = Host::new();
    let first = host.write_log("crash-1.log");
    let second = host.write_log("crash-2.log");
    let mut labeler = host.labeler(false, false);

    let report = labeler.on_initialized(SKYRIM_SE).unwrap();

    assert_eq!(
        report,
        RunReport {
            processed: 2,
            rewritten: 2,
            failed: 0
        }
    );
    assert_eq!(labeler.game(), Some(SKYRIM_SE));
    assert_eq!(fs::read_to_string(first).unwrap(), LABELED);
    assert_eq!(fs::read_to_string(second).unwrap(), LABELED);
    assert_eq!(host.updates(), 1);
}

#[test]
fn test_offline_mode_skips_updater()
{
    let host = Host::new();
    host.write_log("crash-1.log");
    let mut labeler = host.labeler(true, false);

    let report = labeler.on_initialized(SKYRIM_SE).unwrap();
    host.write_log("crash-2.log");
    labeler.on_run_finished(0).unwrap();

    assert_eq!(report.rewritten, 1);
    assert_eq!(host.updates(), 0);
}

#[test]
fn test_run_without_new_logs_does_nothing()
{
    let host = Host::new();
    host.write_log("crash-1.log");
    let mut labeler = host.labeler(false, false);
    labeler.on_initialized(SKYRIM_SE).unwrap();

    let report = labeler.on_run_finished(0).unwrap();

    assert_eq!(report, RunReport::default());
    // Only the update at initialization.
    assert_eq!(host.updates(), 1);
}

#[test]
fn test_run_labels_only_new_logs()
{
    let host = Host::new();
    let mut labeler = host.labeler(false, false);
    assert_eq!(labeler.on_initialized(SKYRIM_SE).unwrap(), RunReport::default());

    let log = host.write_log("crash-1.log");
    let report = labeler.on_run_finished(3).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.rewritten, 1);
    assert_eq!(fs::read_to_string(&log).unwrap(), LABELED);
    assert_eq!(host.updates(), 2);

    // The labeled log is remembered.
    assert_eq!(labeler.on_run_finished(0).unwrap(), RunReport::default());
}

#[test]
fn test_failed_update_uses_local_database()
{
    let host = Host::new();
    let log = host.write_log("crash-1.log");
    let mut labeler = host.labeler(false, true);

    let report = labeler.on_initialized(SKYRIM_SE).unwrap();

    assert_eq!(report.rewritten, 1);
    assert_eq!(fs::read_to_string(log).unwrap(), LABELED);
    assert_eq!(host.updates(), 1);
}

#[test]
fn test_failed_log_is_counted_and_not_retried()
{
    let host = Host::new();
    host.write_log("crash-1.log");
    let refuse = |_: &Path| -> io::Result<()> { Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked")) };
    let mut labeler = CrashLogLabeler::new(host.table.clone(), LabelerSettings::default(), refuse, None);

    let report = labeler.on_initialized(SKYRIM_SE).unwrap();
    assert_eq!(
        report,
        RunReport {
            processed: 1,
            rewritten: 0,
            failed: 1
        }
    );
    assert_eq!(fs::read_to_string(host.logs.join("crash-1.log")).unwrap(), LOG);
    assert_eq!(labeler.on_run_finished(0).unwrap(), RunReport::default());
}

#[test]
fn test_crash_logger_ini_redirects_logs()
{
    let host = Host::new();
    let custom = host.logs.parent().unwrap().join("elsewhere");
    fs::create_dir(&custom).unwrap();
    fs::write(custom.join("crash-1.log"), LOG).unwrap();
    let ini = host.logs.parent().unwrap().join("CrashLogger.ini");
    fs::write(&ini, format!("[Debug]\nCrashlog Directory={}\n", custom.display())).unwrap();

    let mut labeler = host.labeler(true, false).with_crash_logger_ini(&ini);
    let report = labeler.on_initialized(SKYRIM_SE).unwrap();

    assert_eq!(report.rewritten, 1);
    assert_eq!(fs::read_to_string(custom.join("crash-1.log")).unwrap(), LABELED);
}

#[test]
fn test_listing_failure_at_initialization_keeps_game_selected()
{
    let host = Host::new();
    fs::remove_dir(&host.logs).unwrap();
    fs::write(&host.logs, b"not a directory").unwrap();
    let mut labeler = host.labeler(true, false);

    assert!(labeler.on_initialized(SKYRIM_SE).is_err());
    assert_eq!(labeler.game(), Some(SKYRIM_SE));

    fs::remove_file(&host.logs).unwrap();
    fs::create_dir(&host.logs).unwrap();
    let log = host.write_log("crash-1.log");
    let report = labeler.on_run_finished(0).unwrap();

    assert_eq!(report.rewritten, 1);
    assert_eq!(fs::read_to_string(log).unwrap(), LABELED);
}
