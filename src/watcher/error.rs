//! Error types for the watch and reload path.

use std::path::PathBuf;

use thiserror::Error;

use crate::mapper::ParseError;

/// Errors from one file's reload attempt.
///
/// None of these stop the watch loop: the coordinator leaves the file's
/// snapshot time stale so the next sweep retries it.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("cannot read {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {resource}: {source}")]
    ParseFailed {
        resource: String,
        #[source]
        source: ParseError,
    },
}
