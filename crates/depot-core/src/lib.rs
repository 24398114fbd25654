//! # depot-core
//!
//! Core types and primitives for the Depot warehouse planning engine.
//! This crate defines the shared vocabulary used by every other crate in the
//! workspace: the world-state value model, identifiers, lifecycle events, and
//! the unified error type.

pub mod error;
pub mod event;
pub mod types;
pub mod world;

pub use error::{DepotError, Result};
pub use event::{Event, EventBus};
pub use types::*;
pub use world::{Condition, Predicate, Requirement, StateValue, WorldState};
