use thiserror::Error;

/// Unified error type for the entire Depot engine.
#[derive(Error, Debug)]
pub enum DepotError {
    // ── Planning errors ────────────────────────────────────────
    #[error("planning failed: {0}")]
    Planning(String),

    #[error("goal rejected: {0}")]
    GoalRejected(String),

    #[error("goal not found: {0}")]
    GoalNotFound(String),

    // ── Assignment errors ──────────────────────────────────────
    #[error("no eligible agent for goal {goal}")]
    NoEligibleAgent { goal: String },

    #[error("agent {agent} already owns plan {plan}")]
    AgentBusy { agent: String, plan: String },

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    // ── Execution errors ───────────────────────────────────────
    #[error("precondition violated at step {step}: {action} requires {condition}")]
    PreconditionViolated {
        step: usize,
        action: String,
        condition: String,
    },

    #[error("action failed: {action}: {reason}")]
    ActionFailed { action: String, reason: String },

    #[error("action timed out: {action} exceeded {timeout_ms}ms")]
    ActionTimeout { action: String, timeout_ms: u64 },

    #[error("plan timed out: {plan} exceeded {timeout_ms}ms")]
    PlanTimeout { plan: String, timeout_ms: u64 },

    #[error("plan cancelled: {0}")]
    Cancelled(String),

    // ── Configuration errors ───────────────────────────────────
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(String),

    #[error("duplicate action: {0}")]
    DuplicateAction(String),

    #[error("action catalog is empty")]
    EmptyCatalog,

    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl DepotError {
    /// Whether this error belongs to the recoverable planning/assignment/execution
    /// categories that the orchestrator absorbs instead of surfacing to a caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Planning(_)
                | Self::NoEligibleAgent { .. }
                | Self::PreconditionViolated { .. }
                | Self::ActionFailed { .. }
                | Self::ActionTimeout { .. }
                | Self::PlanTimeout { .. }
                | Self::Cancelled(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DepotError>;
