//! End-to-end tests for the polling watch loop.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use mapfresh::watcher::resource_identity;
use mapfresh::{
    DefinitionParser, DefinitionWatcher, MappedStatement, MapperConfiguration, MapperLocation,
    ParseError, Settings, SqlCommand,
};

/// Parser stub: registers the file content as one statement's SQL and
/// records every invocation.
struct RecordingParser {
    statement_id: String,
    calls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingParser {
    fn new(statement_id: &str) -> Self {
        Self {
            statement_id: statement_id.to_string(),
            calls: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

impl DefinitionParser for RecordingParser {
    fn parse(
        &self,
        source: &mut dyn Read,
        configuration: &MapperConfiguration,
        resource: &str,
    ) -> Result<(), ParseError> {
        self.calls.lock().unwrap().push(resource.to_string());

        if self.fail.load(Ordering::SeqCst) {
            return Err(ParseError::Syntax {
                resource: resource.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let mut sql = String::new();
        source.read_to_string(&mut sql)?;

        configuration.add_statement(MappedStatement::new(
            self.statement_id.clone(),
            SqlCommand::Select,
            sql.trim(),
        ))?;
        configuration.mark_resource_loaded(resource);
        Ok(())
    }
}

fn write_definition(dir: &TempDir, name: &str, sql: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, sql).unwrap();
    path
}

fn set_mtime(path: &Path, time: SystemTime) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

fn watcher_with(
    locations: Vec<MapperLocation>,
    configuration: Arc<MapperConfiguration>,
    parser: Arc<RecordingParser>,
    enabled: bool,
) -> DefinitionWatcher {
    let settings = Settings {
        enabled,
        poll_interval_seconds: 1,
        ..Settings::default()
    };
    DefinitionWatcher::new(locations, configuration, parser, &settings)
}

#[test]
fn modified_file_is_reloaded_exactly_once() {
    let dir = TempDir::new().unwrap();
    let path = write_definition(&dir, "user.map", "SELECT 1");
    let canonical = std::fs::canonicalize(&path).unwrap();

    let configuration = Arc::new(MapperConfiguration::new());
    let parser = Arc::new(RecordingParser::new("user.selectById"));
    let mut watcher = watcher_with(
        vec![MapperLocation::file(&path)],
        configuration.clone(),
        parser.clone(),
        true,
    );

    watcher.prime();
    assert_eq!(watcher.snapshot().len(), 1);
    let t0 = watcher.snapshot().last_modified(&canonical).unwrap();

    // Unchanged file: nothing happens.
    assert_eq!(watcher.poll_once(), 0);
    assert!(parser.calls().is_empty());

    // Edit the file and bump its mtime past the recorded baseline.
    std::fs::write(&path, "SELECT 2").unwrap();
    let t1 = SystemTime::now() + Duration::from_secs(10);
    set_mtime(&canonical, t1);

    assert_eq!(watcher.poll_once(), 1);
    assert_eq!(parser.calls(), vec![resource_identity(&canonical)]);
    assert_eq!(
        configuration.statement("user.selectById").unwrap().sql,
        "SELECT 2"
    );

    // Snapshot advanced to the trigger time: the next sweep is quiet.
    assert!(watcher.snapshot().last_modified(&canonical).unwrap() > t0);
    assert_eq!(watcher.poll_once(), 0);
    assert_eq!(parser.calls().len(), 1);
}

#[test]
fn loaded_marker_is_cleared_before_reparse() {
    struct MarkerObservingParser {
        marker_seen: Mutex<Vec<bool>>,
    }

    impl DefinitionParser for MarkerObservingParser {
        fn parse(
            &self,
            _source: &mut dyn Read,
            configuration: &MapperConfiguration,
            resource: &str,
        ) -> Result<(), ParseError> {
            self.marker_seen
                .lock()
                .unwrap()
                .push(configuration.is_resource_loaded(resource));
            configuration.mark_resource_loaded(resource);
            Ok(())
        }
    }

    let dir = TempDir::new().unwrap();
    let path = write_definition(&dir, "user.map", "SELECT 1");
    let canonical = std::fs::canonicalize(&path).unwrap();

    let configuration = Arc::new(MapperConfiguration::new());
    // Pretend the host already parsed this file at startup.
    configuration.mark_resource_loaded(resource_identity(&canonical));

    let parser = Arc::new(MarkerObservingParser {
        marker_seen: Mutex::new(Vec::new()),
    });
    let settings = Settings {
        poll_interval_seconds: 1,
        ..Settings::default()
    };
    let mut watcher = DefinitionWatcher::new(
        vec![MapperLocation::file(&path)],
        configuration.clone(),
        parser.clone(),
        &settings,
    );

    watcher.prime();
    set_mtime(&canonical, SystemTime::now() + Duration::from_secs(10));
    assert_eq!(watcher.poll_once(), 1);

    // The already-loaded marker was removed before the parser ran.
    assert_eq!(*parser.marker_seen.lock().unwrap(), vec![false]);
    // And the parser re-marked it.
    assert!(configuration.is_resource_loaded(&resource_identity(&canonical)));
}

#[test]
fn parse_failure_keeps_baseline_stale_and_retries() {
    let dir = TempDir::new().unwrap();
    let path = write_definition(&dir, "user.map", "SELECT 1");
    let canonical = std::fs::canonicalize(&path).unwrap();

    let configuration = Arc::new(MapperConfiguration::new());
    let parser = Arc::new(RecordingParser::new("user.selectById"));
    let mut watcher = watcher_with(
        vec![MapperLocation::file(&path)],
        configuration.clone(),
        parser.clone(),
        true,
    );

    watcher.prime();
    let t0 = watcher.snapshot().last_modified(&canonical).unwrap();

    parser.set_failing(true);
    std::fs::write(&path, "SELEC 2 -- broken").unwrap();
    set_mtime(&canonical, SystemTime::now() + Duration::from_secs(10));

    // Failed reload: parser ran, baseline unchanged.
    assert_eq!(watcher.poll_once(), 0);
    assert_eq!(parser.calls().len(), 1);
    assert_eq!(watcher.snapshot().last_modified(&canonical), Some(t0));

    // Still stale, so the next sweep retries.
    assert_eq!(watcher.poll_once(), 0);
    assert_eq!(parser.calls().len(), 2);

    // The edit becomes valid: the retry converges.
    parser.set_failing(false);
    std::fs::write(&path, "SELECT 2").unwrap();
    set_mtime(&canonical, SystemTime::now() + Duration::from_secs(20));

    assert_eq!(watcher.poll_once(), 1);
    assert!(watcher.snapshot().last_modified(&canonical).unwrap() > t0);
    assert_eq!(
        configuration.statement("user.selectById").unwrap().sql,
        "SELECT 2"
    );
}

#[test]
fn archived_locations_are_never_watched() {
    let dir = TempDir::new().unwrap();
    let path = write_definition(&dir, "user.map", "SELECT 1");

    let configuration = Arc::new(MapperConfiguration::new());
    let parser = Arc::new(RecordingParser::new("user.selectById"));
    let archived = MapperLocation::archived(
        format!("jar:file:{}!/user.map", path.display()),
        "user.map",
    );
    let mut watcher = watcher_with(vec![archived], configuration, parser.clone(), true);

    watcher.prime();
    assert!(watcher.snapshot().is_empty());

    set_mtime(&path, SystemTime::now() + Duration::from_secs(10));
    assert_eq!(watcher.poll_once(), 0);
    assert!(parser.calls().is_empty());
}

#[test]
fn stat_failure_does_not_stop_the_sweep() {
    let dir = TempDir::new().unwrap();
    let vanishing = write_definition(&dir, "gone.map", "SELECT 1");
    let surviving = write_definition(&dir, "user.map", "SELECT 1");
    let surviving_canonical = std::fs::canonicalize(&surviving).unwrap();

    let configuration = Arc::new(MapperConfiguration::new());
    let parser = Arc::new(RecordingParser::new("user.selectById"));
    let mut watcher = watcher_with(
        vec![
            MapperLocation::file(&vanishing),
            MapperLocation::file(&surviving),
        ],
        configuration,
        parser.clone(),
        true,
    );

    watcher.prime();
    assert_eq!(watcher.snapshot().len(), 2);

    std::fs::remove_file(&vanishing).unwrap();
    std::fs::write(&surviving, "SELECT 2").unwrap();
    set_mtime(&surviving_canonical, SystemTime::now() + Duration::from_secs(10));

    assert_eq!(watcher.poll_once(), 1);
    assert_eq!(parser.calls(), vec![resource_identity(&surviving_canonical)]);
}

#[tokio::test]
async fn disabled_watcher_exits_without_priming_or_polling() {
    let dir = TempDir::new().unwrap();
    let path = write_definition(&dir, "user.map", "SELECT 1");

    let configuration = Arc::new(MapperConfiguration::new());
    let parser = Arc::new(RecordingParser::new("user.selectById"));
    let watcher = watcher_with(
        vec![MapperLocation::file(&path)],
        configuration,
        parser.clone(),
        false,
    );

    // An enabled watcher never returns; a disabled one must return at once.
    tokio::time::timeout(Duration::from_secs(1), watcher.watch())
        .await
        .expect("disabled watcher should exit immediately");

    set_mtime(&path, SystemTime::now() + Duration::from_secs(10));
    assert!(parser.calls().is_empty());
}

#[tokio::test]
async fn background_task_picks_up_edits() {
    let dir = TempDir::new().unwrap();
    let path = write_definition(&dir, "user.map", "SELECT 1");
    let canonical = std::fs::canonicalize(&path).unwrap();

    let configuration = Arc::new(MapperConfiguration::new());
    let parser = Arc::new(RecordingParser::new("user.selectById"));
    let watcher = watcher_with(
        vec![MapperLocation::file(&path)],
        configuration.clone(),
        parser.clone(),
        true,
    );

    let handle = watcher.spawn();

    // Give the loop time to prime and pass its startup grace period.
    tokio::time::sleep(Duration::from_millis(2500)).await;

    std::fs::write(&path, "SELECT 2").unwrap();
    set_mtime(&canonical, SystemTime::now() + Duration::from_secs(10));

    // Within one poll interval the edit takes effect.
    let mut reloaded = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Ok(statement) = configuration.statement("user.selectById") {
            if statement.sql == "SELECT 2" {
                reloaded = true;
                break;
            }
        }
    }
    handle.abort();

    assert!(reloaded, "edit did not take effect within the allotted sweeps");
    assert_eq!(parser.calls(), vec![resource_identity(&canonical)]);
}
