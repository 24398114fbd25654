//! # depot-planner
//!
//! The planning half of the engine: primitive [`Action`]s and the capability
//! indexed [`ActionCatalog`], [`Goal`]s with their category context, [`Plan`]s
//! and their state machine, and the [`Planner`], a backward-chaining
//! best-first search that composes actions into a minimal-cost plan.

pub mod action;
pub mod catalog;
pub mod goal;
pub mod plan;
pub mod planner;

pub use action::Action;
pub use catalog::ActionCatalog;
pub use goal::{Goal, GoalCategory, GoalContext};
pub use plan::Plan;
pub use planner::{PlanResponse, Planner, PlannerOptions, PlanningFailure};
