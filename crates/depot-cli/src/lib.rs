//! # depot-cli
//!
//! Command-line interface for the Depot planning engine.
//!
//! ## Commands
//!
//! - `depot run`: Start the orchestrator against the simulated warehouse
//! - `depot plan`: Plan a single goal and print the action sequence
//! - `depot catalog`: List the action catalog
//! - `depot agents`: List the configured roster
//! - `depot config`: Show the effective configuration
//! - `depot doctor`: Validate the configuration
//! - `depot init`: Write a starter `depot.toml`

pub mod commands;

pub use commands::{Cli, STARTER_CONFIG, parse_key_val, parse_state_value};
