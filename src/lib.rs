//! Hot reload for SQL statement mapping definitions.
//!
//! `mapfresh` watches externally-authored definition files on disk and
//! re-parses the ones that change into a live, shared configuration store,
//! with no host-process restart. It is an embedded component: the host resolves
//! the file locations, owns the definition syntax (via [`DefinitionParser`]),
//! and reads the shared [`MapperConfiguration`] from its request threads
//! while one background task performs all mutation.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mapfresh::{
//!     DefinitionWatcher, MapperConfiguration, MapperLocation, Settings,
//! };
//! # fn parser() -> Arc<dyn mapfresh::DefinitionParser> { unimplemented!() }
//!
//! # async fn arm() {
//! let settings = Settings::load().unwrap_or_default();
//! let configuration = Arc::new(MapperConfiguration::new());
//! let locations = vec![MapperLocation::file("mappers/user.map")];
//!
//! DefinitionWatcher::new(locations, configuration.clone(), parser(), &settings).spawn();
//!
//! // Request threads keep reading `configuration` while edits to
//! // mappers/user.map take effect within one poll interval.
//! # }
//! ```

pub mod config;
pub mod logging;
pub mod mapper;
pub mod registry;
pub mod watcher;

pub use config::Settings;
pub use mapper::{
    DefinitionParser, MappedStatement, MapperConfiguration, MapperLocation, ParseError,
    RegistryUpgrader, SqlCommand,
};
pub use registry::{RegistryError, StrictRegistry};
pub use watcher::{DefinitionWatcher, ReloadCoordinator, WatchError, WatchSnapshot};
