use chrono::{DateTime, Utc};
use depot_core::{AgentId, DepotError, GoalId, PlanId, PlanStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Action;

/// An ordered action sequence realizing one goal, owned by one agent.
///
/// State machine: `pending → executing → {completed | failed | cancelled}`.
/// Transitions out of a terminal state are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub goal_id: GoalId,
    pub agent_id: AgentId,
    pub actions: Vec<Action>,
    pub status: PlanStatus,
    /// Index of the next action to execute.
    pub cursor: usize,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Plan {
    /// Build a pending plan. An empty action list is not a plan.
    pub fn new(
        goal_id: GoalId,
        agent_id: impl Into<AgentId>,
        actions: Vec<Action>,
    ) -> depot_core::Result<Self> {
        if actions.is_empty() {
            return Err(DepotError::Planning("empty action sequence".into()));
        }
        let cost = actions.iter().map(|a| a.cost).sum();
        Ok(Self {
            id: Uuid::new_v4(),
            goal_id,
            agent_id: agent_id.into(),
            actions,
            status: PlanStatus::Pending,
            cursor: 0,
            cost,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            failure_reason: None,
        })
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    /// The action at the cursor, if the plan has one left.
    pub fn next_action(&self) -> Option<&Action> {
        self.actions.get(self.cursor)
    }

    pub fn remaining(&self) -> usize {
        self.actions.len().saturating_sub(self.cursor)
    }

    pub fn progress(&self) -> f32 {
        self.cursor as f32 / self.actions.len() as f32
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn start(&mut self) -> bool {
        if self.status != PlanStatus::Pending {
            return false;
        }
        self.status = PlanStatus::Executing;
        self.started_at = Some(Utc::now());
        true
    }

    /// Move the cursor past the current action.
    pub fn advance(&mut self) {
        if self.status == PlanStatus::Executing && self.cursor < self.actions.len() {
            self.cursor += 1;
        }
    }

    pub fn complete(&mut self) -> bool {
        self.finish(PlanStatus::Completed, None)
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        self.finish(PlanStatus::Failed, Some(reason.into()))
    }

    pub fn cancel(&mut self, reason: impl Into<String>) -> bool {
        self.finish(PlanStatus::Cancelled, Some(reason.into()))
    }

    fn finish(&mut self, status: PlanStatus, reason: Option<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = status;
        self.failure_reason = reason;
        self.finished_at = Some(Utc::now());
        true
    }

    /// Wall-clock time between start and finish, in milliseconds.
    pub fn duration_ms(&self) -> Option<u64> {
        let started = self.started_at?;
        let finished = self.finished_at?;
        Some((finished - started).num_milliseconds().max(0) as u64)
    }
}
