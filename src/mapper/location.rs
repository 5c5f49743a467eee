//! Resolvable definition-file locations handed to the watcher at startup.

use std::path::{Path, PathBuf};

/// Where a definition file's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperSource {
    /// A plain file whose modification time can be observed.
    Filesystem(PathBuf),
    /// Packaged inside an archive. The content is immutable for the process
    /// lifetime, so it can never be hot-reloaded.
    Archived,
}

/// One configured definition-file location.
///
/// The description is free-form text from whoever resolved the location
/// (classpath scanner, glob expansion, static list) and only appears in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperLocation {
    description: String,
    filename: String,
    source: MapperSource,
}

impl MapperLocation {
    /// A location backed by a plain filesystem path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            description: format!("file [{}]", path.display()),
            filename,
            source: MapperSource::Filesystem(path),
        }
    }

    /// A location packaged inside an archive.
    pub fn archived(description: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            filename: filename.into(),
            source: MapperSource::Archived,
        }
    }

    /// Override the human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The path to poll, or `None` when the location's modification time
    /// cannot be observed (archived resources).
    pub fn watchable_path(&self) -> Option<&Path> {
        match &self.source {
            MapperSource::Filesystem(path) => Some(path),
            MapperSource::Archived => None,
        }
    }
}
