//! # depot-runtime
//!
//! Everything that moves: the canonical [`WorldStateStore`], the plan
//! [`Executor`] and its pluggable [`ActionHandler`], the [`AgentRegistry`],
//! the [`ScenarioEngine`] that turns trouble in the world into goals, and the
//! [`Orchestrator`] tying them together behind a monitoring tick.

pub mod executor;
pub mod handler;
pub mod orchestrator;
pub mod registry;
pub mod scenario;
pub mod store;
pub mod warehouse;

pub use executor::{
    ExecutionObserver, ExecutionOptions, ExecutionReport, Executor, NoopObserver, SharedPlan,
};
pub use handler::{ActionContext, ActionHandler, ActionOutcome, SimulatedHandler};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, PendingGoal, SystemStatus, TickSummary};
pub use registry::{Agent, AgentMetrics, AgentRegistry};
pub use scenario::{ScenarioDetector, ScenarioEngine};
pub use store::{WorldChange, WorldSnapshot, WorldStateStore};
