use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for a goal.
pub type GoalId = Uuid;

/// Unique identifier for a plan.
pub type PlanId = Uuid;

/// Agents are identified by roster name, e.g. "picker-1".
pub type AgentId = String;

/// A key in the world state, e.g. "lowStockItems".
pub type StateKey = String;

/// A set of capability tags, e.g. {"picking", "packing"}.
pub type Capabilities = BTreeSet<String>;

/// Well-known world-state keys shared by the built-in actions, goals, and
/// scenario detectors.
pub mod keys {
    pub const ORDERS_IN_QUEUE: &str = "ordersInQueue";
    pub const LOW_STOCK_ITEMS: &str = "lowStockItems";
    pub const QUALITY_ISSUES: &str = "qualityIssues";
    pub const EQUIPMENT_OPERATIONAL: &str = "equipmentOperational";
    pub const INVENTORY_CHECKED: &str = "inventoryChecked";
    pub const RESTOCK_ORDERED: &str = "restockOrdered";
    pub const STOCK_RECEIVED: &str = "stockReceived";
    pub const ORDERS_PICKED: &str = "ordersPicked";
    pub const ORDERS_PACKED: &str = "ordersPacked";
    pub const BATCH_INSPECTED: &str = "batchInspected";
    pub const EQUIPMENT_DIAGNOSED: &str = "equipmentDiagnosed";
}

/// The role an agent plays on the warehouse floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Picker,
    Receiver,
    Inspector,
    Maintenance,
    General,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Picker => "picker",
            Self::Receiver => "receiver",
            Self::Inspector => "inspector",
            Self::Maintenance => "maintenance",
            Self::General => "general",
        })
    }
}

/// Lifecycle of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Executing,
    Completed,
    Failed,
    Cancelled,
}

impl PlanStatus {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Run state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    Stopped,
    Running,
}

impl std::fmt::Display for SystemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
        })
    }
}
