//! The shared mapper configuration and its collaborators.
//!
//! [`MapperConfiguration`] is the process-wide store of statement mappings
//! that host threads read while the watch task mutates it during reloads.
//! [`DefinitionParser`] is the seam to the host's definition syntax;
//! [`MapperLocation`] describes where definition files come from.

mod configuration;
mod location;
mod parser;
mod types;
mod upgrader;

pub use configuration::{MapperConfiguration, ReloadGuard};
pub use location::{MapperLocation, MapperSource};
pub use parser::{DefinitionParser, ParseError};
pub use types::{
    ColumnMapping, KeyGenerator, MappedStatement, ParameterMap, QueryCache, ResultMap, SqlCommand,
    SqlFragment,
};
pub use upgrader::RegistryUpgrader;
