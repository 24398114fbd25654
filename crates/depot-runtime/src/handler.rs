use async_trait::async_trait;
use depot_config::schema::SimulationConfig;
use depot_core::{AgentId, DepotError, GoalId, PlanId};
use depot_planner::Action;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::store::WorldSnapshot;

/// What a handler sees while performing one plan step.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub plan_id: PlanId,
    pub goal_id: GoalId,
    pub agent_id: AgentId,
    /// 1-based position of the action in its plan.
    pub step: usize,
    /// The world as it was when the step's preconditions were checked.
    pub world: Arc<WorldSnapshot>,
    /// Fires when the plan is cancelled. Handlers may stop early; the executor
    /// never aborts them.
    pub cancellation_token: CancellationToken,
}

impl ActionContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

/// Result of a successful action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub detail: String,
}

impl ActionOutcome {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Performs the real-world side of an action (moving stock, confirming a
/// scan, ...). The executor applies the action's effects once this returns
/// `Ok`.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn perform(&self, action: &Action, ctx: &ActionContext) -> depot_core::Result<ActionOutcome>;
}

/// Stand-in for the warehouse floor: waits for the action's `durationMs` (or
/// a default latency) and succeeds, unless told to fail that action.
#[derive(Debug, Clone)]
pub struct SimulatedHandler {
    default_latency: Duration,
    failing: HashSet<String>,
}

impl SimulatedHandler {
    pub fn new(default_latency: Duration) -> Self {
        Self {
            default_latency,
            failing: HashSet::new(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(Duration::from_millis(config.action_latency_ms))
    }

    /// Make every run of `action` fail after its latency.
    pub fn fail_on(mut self, action: impl Into<String>) -> Self {
        self.failing.insert(action.into());
        self
    }
}

#[async_trait]
impl ActionHandler for SimulatedHandler {
    async fn perform(&self, action: &Action, ctx: &ActionContext) -> depot_core::Result<ActionOutcome> {
        let latency = action
            .duration_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_latency);
        debug!(
            action = %action.name,
            agent = %ctx.agent_id,
            step = ctx.step,
            latency_ms = latency.as_millis() as u64,
            "simulating action"
        );

        tokio::select! {
            _ = ctx.cancellation_token.cancelled() => {
                return Err(DepotError::Cancelled(format!("{} interrupted", action.name)));
            }
            _ = tokio::time::sleep(latency) => {}
        }

        if self.failing.contains(&action.name) {
            return Err(DepotError::ActionFailed {
                action: action.name.clone(),
                reason: "simulated fault".into(),
            });
        }
        Ok(ActionOutcome::new(format!("{} done by {}", action.name, ctx.agent_id)))
    }
}
