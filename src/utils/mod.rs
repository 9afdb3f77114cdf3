//! Configuration, persistence and logging

pub mod config;
pub mod store;
pub mod logging;

pub use config::{CompassConfig, ConfigError, ConfigurationManager};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
