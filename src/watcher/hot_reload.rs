//! Polling watcher that hot-reloads changed definition files.
//!
//! One background task polls the modification time of every watched file and
//! re-parses the ones that changed, without restarting the host process.
//! There is deliberately no filesystem event subscription: a fixed watch set
//! and a coarse poll interval are enough for definition files that change at
//! editing speed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::warn;

use crate::config::Settings;
use crate::mapper::{DefinitionParser, MapperConfiguration, MapperLocation};

use super::reload::ReloadCoordinator;
use super::snapshot::WatchSnapshot;

/// Watches definition files and reloads them into the shared configuration.
///
/// The loop: prime a snapshot of modification times, sleep a startup grace
/// period, then sweep all watched files once per poll interval. A file whose
/// on-disk time is strictly newer than its snapshot baseline is reloaded;
/// per-file failures are logged and retried on later sweeps.
pub struct DefinitionWatcher {
    locations: Vec<MapperLocation>,
    configuration: Arc<MapperConfiguration>,
    coordinator: ReloadCoordinator,
    snapshot: WatchSnapshot,
    enabled: bool,
    poll_interval: Duration,
}

impl DefinitionWatcher {
    pub fn new(
        locations: Vec<MapperLocation>,
        configuration: Arc<MapperConfiguration>,
        parser: Arc<dyn DefinitionParser>,
        settings: &Settings,
    ) -> Self {
        Self {
            locations,
            configuration,
            coordinator: ReloadCoordinator::new(parser),
            snapshot: WatchSnapshot::new(),
            enabled: settings.enabled,
            poll_interval: settings.poll_interval(),
        }
    }

    /// Build the initial snapshot from the configured locations.
    ///
    /// Archived locations can never change on disk, so they are skipped
    /// permanently. Paths are canonicalized so the snapshot key matches the
    /// identity handed to the parser. A location whose metadata cannot be
    /// read is logged and left out of the watch set.
    pub fn prime(&mut self) {
        for location in &self.locations {
            crate::debug_event!("watcher", "location", "{}", location.description());

            let Some(path) = location.watchable_path() else {
                crate::debug_event!(
                    "watcher",
                    "skipping archived resource",
                    "{}",
                    location.filename()
                );
                continue;
            };

            let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            match std::fs::metadata(&path).and_then(|metadata| metadata.modified()) {
                Ok(modified) => {
                    self.snapshot.record(path, modified);
                }
                Err(e) => {
                    warn!("[watcher] cannot stat {}: {e}", path.display());
                }
            }
        }

        crate::log_event!("watcher", "monitoring", "{} files", self.snapshot.len());
    }

    /// Run the watch loop until the process exits.
    ///
    /// Returns immediately when hot reload is disabled in settings.
    pub async fn watch(mut self) {
        if !self.enabled {
            crate::log_event!("watcher", "hot reload disabled, not starting");
            return;
        }

        self.prime();

        // Let the host finish its own startup before the first sweep.
        tokio::time::sleep(self.poll_interval).await;

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.poll_once();
        }
    }

    /// Run the watch loop on a background task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.watch())
    }

    /// One sweep over every watched file.
    ///
    /// Returns the number of files successfully reloaded. Stat and reload
    /// failures are logged and never stop the rest of the sweep; a failed
    /// file keeps its stale baseline and is retried next time. Exposed so
    /// tests and embedders can drive sweeps on their own schedule.
    pub fn poll_once(&mut self) -> usize {
        let watched: Vec<(PathBuf, std::time::SystemTime)> = self
            .snapshot
            .entries()
            .map(|(path, time)| (path.to_path_buf(), time))
            .collect();

        let mut reloaded = 0;
        for (path, baseline) in watched {
            let modified = match std::fs::metadata(&path).and_then(|metadata| metadata.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("[watcher] cannot stat {}: {e}", path.display());
                    continue;
                }
            };

            if modified <= baseline {
                continue;
            }

            crate::debug_event!("watcher", "changed", "{}", path.display());
            match self
                .coordinator
                .reload(&path, &self.configuration, &mut self.snapshot)
            {
                Ok(()) => reloaded += 1,
                Err(e) => {
                    tracing::error!("[watcher] reload failed, will retry: {e}");
                }
            }
        }

        reloaded
    }

    /// The current snapshot, for observability and tests.
    pub fn snapshot(&self) -> &WatchSnapshot {
        &self.snapshot
    }
}
