//! Reload protocol for a single changed definition file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::mapper::{DefinitionParser, MapperConfiguration, RegistryUpgrader};

use super::error::WatchError;
use super::snapshot::WatchSnapshot;

/// Re-parses one changed definition file into the shared configuration.
///
/// The sequence for each file: enter reload mode, make sure every collection
/// is strict, drop the file's already-loaded marker, hand the open file to
/// the parser, and on success record the file's new modification time. The
/// reload guard and the parser's diagnostic state are cleared on every exit
/// path.
pub struct ReloadCoordinator {
    parser: Arc<dyn DefinitionParser>,
}

impl ReloadCoordinator {
    pub fn new(parser: Arc<dyn DefinitionParser>) -> Self {
        Self { parser }
    }

    /// Reload `path` into `configuration`.
    ///
    /// On failure the snapshot entry is left untouched, so the file's on-disk
    /// time still exceeds the recorded baseline and the next sweep retries.
    /// A parser that registered some entries before failing leaves them in
    /// place (no rollback); the retry converges through reload-mode
    /// remove-then-reinsert once the file parses.
    pub fn reload(
        &self,
        path: &Path,
        configuration: &MapperConfiguration,
        snapshot: &mut WatchSnapshot,
    ) -> Result<(), WatchError> {
        let guard = configuration.begin_reload();
        let result = self.attempt(path, configuration, snapshot);
        self.parser.reset();
        drop(guard);
        result
    }

    fn attempt(
        &self,
        path: &Path,
        configuration: &MapperConfiguration,
        snapshot: &mut WatchSnapshot,
    ) -> Result<(), WatchError> {
        RegistryUpgrader::ensure_strict(configuration);

        let resource = resource_identity(path);
        configuration.forget_resource(&resource);

        let file = File::open(path).map_err(|source| WatchError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let modified = modification_time(&file, path)?;
        let mut reader = BufReader::new(file);

        self.parser
            .parse(&mut reader, configuration, &resource)
            .map_err(|source| WatchError::ParseFailed {
                resource: resource.clone(),
                source,
            })?;

        snapshot.record(path.to_path_buf(), modified);
        crate::log_event!("reload", "refreshed", "{resource}");
        Ok(())
    }
}

/// Canonical identity of a definition file: its path with directory
/// separators normalized to `/`.
pub fn resource_identity(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// The file's modification time, read from the handle that will be parsed.
///
/// Taken before parsing: a writer touching the file mid-parse keeps the
/// on-disk time ahead of the recorded one, so the next sweep picks the
/// change up instead of losing it.
fn modification_time(file: &File, path: &Path) -> Result<SystemTime, WatchError> {
    file.metadata()
        .and_then(|metadata| metadata.modified())
        .map_err(|source| WatchError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })
}
