//! The parse-and-register seam between this crate and the host's definition
//! syntax.

use std::io::Read;

use thiserror::Error;

use crate::registry::RegistryError;

use super::configuration::MapperConfiguration;

/// Errors from a definition-file parse.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed definition in {resource}: {reason}")]
    Syntax { resource: String, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("I/O error reading definition: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses one definition file and registers its contents.
///
/// Implementations own the file syntax entirely. The contract:
///
/// - Read the definition from `source` (a buffered handle on the changed
///   file).
/// - Register every statement, cache, result map, parameter map, key
///   generator, and SQL fragment through the configuration's `add_*` methods.
///   During a reload those inserts replace the previous entries for the same
///   keys; at any other time a duplicate key is an error.
/// - Skip files whose identity [`is_resource_loaded`] already, and call
///   [`mark_resource_loaded`] with `resource` once registration succeeds.
///
/// `resource` is the file's canonical identity: its absolute path with
/// directory separators normalized to `/`.
///
/// [`is_resource_loaded`]: MapperConfiguration::is_resource_loaded
/// [`mark_resource_loaded`]: MapperConfiguration::mark_resource_loaded
pub trait DefinitionParser: Send + Sync {
    fn parse(
        &self,
        source: &mut dyn Read,
        configuration: &MapperConfiguration,
        resource: &str,
    ) -> Result<(), ParseError>;

    /// Clear any per-parse diagnostic state.
    ///
    /// Called by the reload coordinator after every attempt, success or
    /// failure, so state from a failed parse cannot leak into the next one.
    fn reset(&self) {}
}
