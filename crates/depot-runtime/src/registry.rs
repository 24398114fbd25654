use depot_config::AgentConfig;
use depot_core::{AgentId, AgentKind, Capabilities, DepotError, PlanId, PlanStatus, WorldState};
use depot_planner::{Goal, GoalCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::WorldSnapshot;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub tasks_completed: u64,
    /// Failed and cancelled plans.
    pub tasks_failed: u64,
    /// Mean wall-clock duration over all finished plans.
    pub average_duration_ms: f64,
}

impl AgentMetrics {
    pub fn record(&mut self, status: PlanStatus, duration_ms: u64) {
        match status {
            PlanStatus::Completed => self.tasks_completed += 1,
            PlanStatus::Failed | PlanStatus::Cancelled => self.tasks_failed += 1,
            PlanStatus::Pending | PlanStatus::Executing => return,
        }
        let finished = (self.tasks_completed + self.tasks_failed) as f64;
        self.average_duration_ms += (duration_ms as f64 - self.average_duration_ms) / finished;
    }
}

/// A worker on the warehouse floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AgentKind,
    pub capabilities: Capabilities,
    pub priority: i32,
    #[serde(default)]
    pub current_plan: Option<PlanId>,
    /// Local read-only copy of the world, refreshed after every apply.
    #[serde(default)]
    pub world_state: WorldState,
    #[serde(default)]
    pub world_version: u64,
    #[serde(default)]
    pub metrics: AgentMetrics,
    pub is_active: bool,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, kind: AgentKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            capabilities: Capabilities::new(),
            priority: 0,
            current_plan: None,
            world_state: WorldState::new(),
            world_version: 0,
            metrics: AgentMetrics::default(),
            is_active: true,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.insert(tag.into());
        self
    }

    pub fn capabilities<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_idle(&self) -> bool {
        self.current_plan.is_none()
    }

    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.contains(tag)
    }

    /// Holds every capability the category requires.
    pub fn qualifies_for(&self, category: GoalCategory) -> bool {
        category
            .required_capabilities()
            .iter()
            .all(|tag| self.has_capability(tag))
    }

    /// `priority + bonus` for each capability the category prefers.
    pub fn score(&self, category: GoalCategory, capability_bonus: i32) -> i32 {
        let matches = category
            .preferred_capabilities()
            .iter()
            .filter(|tag| self.has_capability(tag))
            .count() as i32;
        self.priority + capability_bonus * matches
    }
}

impl From<&AgentConfig> for Agent {
    fn from(config: &AgentConfig) -> Self {
        let mut agent = Agent::new(config.id.clone(), config.kind)
            .capabilities(config.capabilities.iter().cloned())
            .priority(config.priority);
        if let Some(name) = &config.name {
            agent.name = name.clone();
        }
        agent.is_active = config.active;
        agent
    }
}

/// The roster, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_agents(agents: impl IntoIterator<Item = Agent>) -> depot_core::Result<Self> {
        let mut registry = Self::new();
        for agent in agents {
            registry.add(agent)?;
        }
        Ok(registry)
    }

    pub fn add(&mut self, agent: Agent) -> depot_core::Result<()> {
        if agent.id.trim().is_empty() {
            return Err(DepotError::ConfigValidation {
                field: "agent.id".into(),
                reason: "agent id is empty".into(),
            });
        }
        if self.get(&agent.id).is_some() {
            return Err(DepotError::DuplicateAgent(agent.id));
        }
        info!(agent = %agent.id, kind = %agent.kind, capabilities = ?agent.capabilities, "agent registered");
        self.agents.push(agent);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Agent> {
        let index = self.agents.iter().position(|a| a.id == id)?;
        let agent = self.agents.remove(index);
        info!(agent = %agent.id, "agent removed");
        Some(agent)
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> depot_core::Result<&mut Agent> {
        self.agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DepotError::AgentNotFound(id.to_string()))
    }

    pub fn list(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active).count()
    }

    pub fn busy_count(&self) -> usize {
        self.agents.iter().filter(|a| !a.is_idle()).count()
    }

    /// The highest-scoring active, idle agent qualified for the goal's category.
    /// Ties go to the agent registered first.
    pub fn find_best_agent(&self, goal: &Goal, capability_bonus: i32) -> Option<&Agent> {
        let best = self.ranked_agents(goal, capability_bonus).into_iter().next();
        if let Some(agent) = best {
            debug!(goal_id = %goal.id, category = %goal.category(), agent = %agent.id, "selected agent");
        }
        best
    }

    /// Every active, idle agent qualified for the goal's category, best score
    /// first. Equal scores keep registration order.
    pub fn ranked_agents(&self, goal: &Goal, capability_bonus: i32) -> Vec<&Agent> {
        let category = goal.category();
        let mut ranked: Vec<(&Agent, i32)> = self
            .agents
            .iter()
            .filter(|a| a.is_active && a.is_idle() && a.qualifies_for(category))
            .map(|a| (a, a.score(category, capability_bonus)))
            .collect();
        ranked.sort_by_key(|&(_, score)| std::cmp::Reverse(score));
        ranked.into_iter().map(|(agent, _)| agent).collect()
    }

    /// Give `plan` to the agent. An agent owns at most one plan.
    pub fn bind_plan(&mut self, id: &str, plan: PlanId) -> depot_core::Result<()> {
        let agent = self.get_mut(id)?;
        if let Some(current) = agent.current_plan {
            return Err(DepotError::AgentBusy {
                agent: id.to_string(),
                plan: current.to_string(),
            });
        }
        agent.current_plan = Some(plan);
        Ok(())
    }

    /// Free the agent if it still owns `plan`.
    pub fn release(&mut self, id: &str, plan: PlanId) -> bool {
        match self.get_mut(id) {
            Ok(agent) if agent.current_plan == Some(plan) => {
                agent.current_plan = None;
                true
            }
            _ => false,
        }
    }

    pub fn record_outcome(&mut self, id: &str, status: PlanStatus, duration_ms: u64) {
        if let Ok(agent) = self.get_mut(id) {
            agent.metrics.record(status, duration_ms);
        }
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> depot_core::Result<()> {
        self.get_mut(id)?.is_active = active;
        Ok(())
    }

    /// Refresh every agent's local copy of the world.
    pub fn sync_world(&mut self, snapshot: &WorldSnapshot) {
        for agent in &mut self.agents {
            if snapshot.version >= agent.world_version {
                agent.world_state = snapshot.state.clone();
                agent.world_version = snapshot.version;
            }
        }
    }
}
