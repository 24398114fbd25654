use depot_core::{Capabilities, Condition, Requirement, StateValue, WorldState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A primitive state transition: if `preconditions` hold, performing the action
/// produces `effects`. Actions never touch the world themselves; the executor
/// applies their effects after a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub preconditions: BTreeMap<String, Requirement>,
    pub effects: WorldState,
    #[serde(default = "default_cost")]
    pub cost: f64,
    #[serde(default)]
    pub required_capabilities: Capabilities,
    /// Simulated latency of the physical operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Overrides the executor's per-action timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_cost() -> f64 {
    1.0
}

impl Action {
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            preconditions: BTreeMap::new(),
            effects: WorldState::new(),
            cost,
            required_capabilities: Capabilities::new(),
            duration_ms: None,
            timeout_ms: None,
        }
    }

    pub fn requires(mut self, key: impl Into<String>, requirement: impl Into<Requirement>) -> Self {
        self.preconditions.insert(key.into(), requirement.into());
        self
    }

    pub fn produces(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.effects.insert(key, value);
        self
    }

    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.required_capabilities.insert(tag.into());
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// The first precondition that does not hold in `state`, if any.
    pub fn violated_precondition(&self, state: &WorldState) -> Option<Condition> {
        state.first_unsatisfied(&self.preconditions)
    }

    pub fn preconditions_hold(&self, state: &WorldState) -> bool {
        state.satisfies(&self.preconditions)
    }

    /// Whether an agent with `capabilities` may perform this action.
    pub fn performable_by(&self, capabilities: &Capabilities) -> bool {
        self.required_capabilities.is_subset(capabilities)
    }
}
