//! Polling watch loop and reload protocol for definition files.
//!
//! # Architecture
//!
//! ```text
//! DefinitionWatcher (one background task)
//!   - WatchSnapshot: path -> last-modified baseline
//!   - polls every file once per interval
//!         |
//!   ReloadCoordinator (per changed file)
//!   - reload guard + collection upgrade + re-parse
//!         |
//!   MapperConfiguration (shared, read concurrently by host threads)
//! ```

mod error;
mod hot_reload;
mod reload;
mod snapshot;

pub use error::WatchError;
pub use hot_reload::DefinitionWatcher;
pub use reload::{ReloadCoordinator, resource_identity};
pub use snapshot::WatchSnapshot;
