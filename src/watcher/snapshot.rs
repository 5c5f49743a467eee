//! Baseline modification times for the watched definition files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The path → last-modified map used to detect changed files between polls.
///
/// Membership is fixed once priming completes; reloads only move recorded
/// times forward.
#[derive(Debug, Default)]
pub struct WatchSnapshot {
    times: HashMap<PathBuf, SystemTime>,
}

impl WatchSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or advance) the last-seen modification time for a path.
    pub fn record(&mut self, path: PathBuf, modified: SystemTime) {
        self.times.insert(path, modified);
    }

    /// The recorded baseline for a path, if it is being watched.
    pub fn last_modified(&self, path: &Path) -> Option<SystemTime> {
        self.times.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.times.contains_key(path)
    }

    /// All watched paths with their recorded baselines.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, SystemTime)> {
        self.times.iter().map(|(path, time)| (path.as_path(), *time))
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
