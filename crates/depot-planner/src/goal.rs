use chrono::{DateTime, Utc};
use depot_core::{GoalId, Requirement, WorldState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A desired world state the system should reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default = "Uuid::new_v4")]
    pub id: GoalId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Every entry must hold for the goal to be satisfied.
    pub target_state: BTreeMap<String, Requirement>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub context: GoalContext,
    /// Scenario class that synthesized this goal, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            target_state: BTreeMap::new(),
            priority: 0,
            context: GoalContext::General,
            scenario: None,
            created_at: Utc::now(),
        }
    }

    pub fn target(mut self, key: impl Into<String>, requirement: impl Into<Requirement>) -> Self {
        self.target_state.insert(key.into(), requirement.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn context(mut self, context: GoalContext) -> Self {
        self.context = context;
        self
    }

    pub fn scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    pub fn category(&self) -> GoalCategory {
        self.context.category()
    }

    pub fn is_satisfied_by(&self, state: &WorldState) -> bool {
        state.satisfies(&self.target_state)
    }
}

/// Category-specific context attached to a goal, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GoalContext {
    OrderFulfillment {
        #[serde(default)]
        order_ids: Vec<String>,
    },
    InventoryOptimization {
        #[serde(default)]
        skus: Vec<String>,
    },
    QualityAssurance {
        #[serde(default)]
        issues: Vec<String>,
    },
    EquipmentMaintenance {
        #[serde(default)]
        equipment_id: Option<String>,
    },
    #[default]
    General,
}

impl GoalContext {
    pub fn category(&self) -> GoalCategory {
        match self {
            Self::OrderFulfillment { .. } => GoalCategory::OrderFulfillment,
            Self::InventoryOptimization { .. } => GoalCategory::InventoryOptimization,
            Self::QualityAssurance { .. } => GoalCategory::QualityAssurance,
            Self::EquipmentMaintenance { .. } => GoalCategory::EquipmentMaintenance,
            Self::General => GoalCategory::General,
        }
    }
}

/// The closed set of goal categories used for agent scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    OrderFulfillment,
    InventoryOptimization,
    QualityAssurance,
    EquipmentMaintenance,
    General,
}

impl GoalCategory {
    /// Capabilities an agent must hold to be considered for this category.
    pub fn required_capabilities(&self) -> &'static [&'static str] {
        match self {
            Self::OrderFulfillment => &["picking"],
            Self::InventoryOptimization => &["inventory"],
            Self::QualityAssurance => &["inspection"],
            Self::EquipmentMaintenance => &["maintenance"],
            Self::General => &[],
        }
    }

    /// Capabilities that each earn a scoring bonus for this category.
    pub fn preferred_capabilities(&self) -> &'static [&'static str] {
        match self {
            Self::OrderFulfillment => &["picking", "packing", "shipping"],
            Self::InventoryOptimization => &["inventory", "receiving", "forklift"],
            Self::QualityAssurance => &["inspection", "quality"],
            Self::EquipmentMaintenance => &["maintenance", "diagnostics"],
            Self::General => &[],
        }
    }
}

impl std::fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::OrderFulfillment => "order_fulfillment",
            Self::InventoryOptimization => "inventory_optimization",
            Self::QualityAssurance => "quality_assurance",
            Self::EquipmentMaintenance => "equipment_maintenance",
            Self::General => "general",
        })
    }
}
