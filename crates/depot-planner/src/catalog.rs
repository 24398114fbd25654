use depot_core::{Capabilities, DepotError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::action::Action;

/// The registered action library, in registration order, indexed by the
/// capabilities each action requires.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<Action>,
    by_name: HashMap<String, usize>,
    by_capability: BTreeMap<String, Vec<usize>>,
    /// Actions with no capability requirement.
    unrestricted: Vec<usize>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of actions, failing on the first invalid one.
    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> depot_core::Result<Self> {
        let mut catalog = Self::new();
        for action in actions {
            catalog.register(action)?;
        }
        Ok(catalog)
    }

    /// Register an action. Registration order is the planner's final tie-breaker.
    pub fn register(&mut self, action: Action) -> depot_core::Result<()> {
        if self.by_name.contains_key(&action.name) {
            return Err(DepotError::DuplicateAction(action.name));
        }
        if !action.cost.is_finite() || action.cost < 0.0 {
            return Err(DepotError::ConfigValidation {
                field: format!("actions.{}.cost", action.name),
                reason: format!("cost must be a non-negative number, got {}", action.cost),
            });
        }
        if action.effects.is_empty() {
            return Err(DepotError::ConfigValidation {
                field: format!("actions.{}.effects", action.name),
                reason: "action has no effects".into(),
            });
        }

        let index = self.actions.len();
        if action.required_capabilities.is_empty() {
            self.unrestricted.push(index);
        }
        for tag in &action.required_capabilities {
            self.by_capability.entry(tag.clone()).or_default().push(index);
        }
        self.by_name.insert(action.name.clone(), index);
        debug!(action = %action.name, index, "registered action");
        self.actions.push(action);
        Ok(())
    }

    /// Actions an agent holding `capabilities` can perform, in registration order.
    pub fn for_capabilities(&self, capabilities: &Capabilities) -> Vec<Action> {
        let mut indices: BTreeSet<usize> = self.unrestricted.iter().copied().collect();
        for tag in capabilities {
            if let Some(candidates) = self.by_capability.get(tag) {
                indices.extend(
                    candidates
                        .iter()
                        .copied()
                        .filter(|&i| self.actions[i].performable_by(capabilities)),
                );
            }
        }
        indices.into_iter().map(|i| self.actions[i].clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.by_name.get(name).map(|&i| &self.actions[i])
    }

    pub fn all(&self) -> &[Action] {
        &self.actions
    }

    /// Every capability tag some action requires.
    pub fn capabilities(&self) -> impl Iterator<Item = &String> {
        self.by_capability.keys()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
