//! Error types for strict registries.

use thiserror::Error;

/// Errors from registry lookups and mutations.
///
/// Every variant names the registry it came from so that a failure inside a
/// re-parse points at the collection that rejected the entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{registry} already contains an entry for {key}")]
    DuplicateKey { registry: String, key: String },

    #[error("{registry} does not contain an entry for {key}")]
    NotFound { registry: String, key: String },

    #[error(
        "{subject} is ambiguous in {registry} (try using the full name including the namespace, or rename one of the entries)"
    )]
    Ambiguous { registry: String, subject: String },

    #[error("{key} in {registry} was degraded during migration: {reason}")]
    Degraded {
        registry: String,
        key: String,
        reason: String,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
