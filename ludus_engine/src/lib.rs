#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const LUDUS_VERSION: &str = env!("CARGO_PKG_VERSION");

// Parsing
pub mod extract;
pub mod localization;
pub mod sanitize;

// Resolvers
pub mod classes;
pub mod combo;
pub mod items;
pub mod locations;
pub mod prizes;
pub mod roster;
pub mod skills;

// Datasets and queries
pub mod config;
pub mod data_paths;
pub mod query;
pub mod snapshot;
pub mod store;

// Output
pub mod render;
pub mod style;

// Re-exports for convenience
pub use config::{DatasetLayout, LudusConfig, load_config};
pub use query::{QueryEngine, QueryError};
pub use roster::StatSetMode;
pub use sanitize::{DatasetId, sanitize};
pub use snapshot::{DatasetFile, DatasetSnapshot};
pub use store::{DatasetStore, FsStore, MemoryStore, StoreError};
