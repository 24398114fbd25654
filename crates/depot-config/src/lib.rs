//! # depot-config
//!
//! Configuration system for the Depot engine. Reads from `depot.toml`, then
//! environment variables, then CLI overrides, in that precedence order.
//!
//! Supports hot-reload via filesystem watcher.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::DepotConfig;
pub use schema::{AgentConfig, ConfigWarning, WarningSeverity};
