use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::PlanStatus;

/// Lifecycle events published on the [`EventBus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    // ── Goal lifecycle ─────────────────────────────────────────
    GoalSubmitted {
        goal_id: Uuid,
        name: String,
        priority: i32,
    },
    GoalAssigned {
        goal_id: Uuid,
        agent_id: String,
        plan_id: Uuid,
    },
    GoalRetired {
        goal_id: Uuid,
        status: PlanStatus,
    },
    GoalSatisfied {
        goal_id: Uuid,
    },
    GoalAbandoned {
        goal_id: Uuid,
        attempts: u32,
        reason: String,
    },
    PlanningFailed {
        goal_id: Uuid,
        agent_id: String,
        reason: String,
    },
    ScenarioDetected {
        scenario: String,
        goal_id: Uuid,
    },

    // ── Plan lifecycle ─────────────────────────────────────────
    PlanStarted {
        plan_id: Uuid,
        agent_id: String,
        steps: usize,
    },
    ActionCompleted {
        plan_id: Uuid,
        agent_id: String,
        action: String,
        step: usize,
    },
    PlanFinished {
        plan_id: Uuid,
        agent_id: String,
        status: PlanStatus,
        reason: Option<String>,
    },

    // ── World / agents ─────────────────────────────────────────
    WorldStateChanged {
        version: u64,
        keys: Vec<String>,
    },
    AgentAdded {
        agent_id: String,
    },
    AgentRemoved {
        agent_id: String,
    },

    // ── System ─────────────────────────────────────────────────
    Tick {
        count: u64,
        timestamp: DateTime<Utc>,
    },
    SystemStarted,
    SystemStopped,
}

/// A broadcast-based event bus for engine-wide pub/sub.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<Event>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn publish(&self, event: Event) {
        // Ignore send errors (no subscribers).
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
