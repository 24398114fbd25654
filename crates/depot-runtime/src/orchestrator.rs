//! The orchestrator: accepts goals, picks agents, plans, and runs plans.
//!
//! While running, a monitoring loop ticks at `orchestrator.tick_interval_ms`.
//! Each tick detects trouble scenarios in the world, queues a goal for each
//! new one, and sweeps the queue: qualified idle agents are tried in score
//! order until the planner finds a plan with one agent's actions, and that
//! plan runs on its own task. Finished plans free their agent and land in a
//! bounded history.
//!
//! A scenario whose goal was abandoned is not detected again until the world
//! version moves past the version it was abandoned at.

use chrono::{DateTime, Utc};
use depot_config::DepotConfig;
use depot_core::{DepotError, Event, EventBus, GoalId, PlanId, PlanStatus, SystemState, WorldState};
use depot_planner::{Action, ActionCatalog, Goal, Plan, Planner, PlannerOptions, PlanningFailure};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::executor::{ExecutionObserver, ExecutionOptions, ExecutionReport, Executor, SharedPlan};
use crate::handler::{ActionContext, ActionHandler, ActionOutcome, SimulatedHandler};
use crate::registry::{Agent, AgentRegistry};
use crate::scenario::{ScenarioDetector, ScenarioEngine};
use crate::store::{WorldChange, WorldSnapshot, WorldStateStore};
use crate::warehouse;

/// A goal waiting for an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingGoal {
    pub goal: Goal,
    /// Planning failures so far.
    pub attempts: u32,
    pub submitted_at: DateTime<Utc>,
}

impl PendingGoal {
    fn new(goal: Goal) -> Self {
        Self {
            goal,
            attempts: 0,
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub state: SystemState,
    pub active_agents: usize,
    pub busy_agents: usize,
    pub running_plans: usize,
    pub completed_plans: u64,
    pub failed_plans: u64,
    pub cancelled_plans: u64,
    pub pending_goals: usize,
    pub world_version: u64,
    pub ticks: u64,
    pub uptime_secs: u64,
}

/// What one monitoring tick did.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSummary {
    pub tick: u64,
    /// Scenario classes that produced a new goal.
    pub detected: Vec<String>,
    pub assigned: usize,
    pub pending: usize,
}

struct ActivePlan {
    plan: SharedPlan,
    goal: Goal,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Counters {
    completed: u64,
    failed: u64,
    cancelled: u64,
    ticks: u64,
}

struct Lifecycle {
    state: SystemState,
    started_at: Option<Instant>,
    tick_token: Option<CancellationToken>,
    tick_handle: Option<JoinHandle<()>>,
}

// Lock order when nesting: goals → lifecycle → registry → active.
// `suppressed` is a leaf.
struct Inner {
    config: Arc<RwLock<DepotConfig>>,
    store: Arc<WorldStateStore>,
    catalog: ActionCatalog,
    registry: RwLock<AgentRegistry>,
    executor: Executor,
    scenarios: ScenarioEngine,
    bus: EventBus,
    goals: Mutex<VecDeque<PendingGoal>>,
    /// Abandoned scenario class → world version at abandonment.
    suppressed: Mutex<HashMap<String, u64>>,
    active: Mutex<HashMap<PlanId, ActivePlan>>,
    history: Mutex<VecDeque<Plan>>,
    counters: Mutex<Counters>,
    lifecycle: Mutex<Lifecycle>,
}

/// Cheap to clone; all clones drive the same system.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

pub struct OrchestratorBuilder {
    config: Option<Arc<RwLock<DepotConfig>>>,
    catalog: Option<ActionCatalog>,
    handler: Option<Arc<dyn ActionHandler>>,
    agents: Option<Vec<Agent>>,
    detectors: Vec<Box<dyn ScenarioDetector>>,
    builtin_detectors: bool,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self {
            config: None,
            catalog: None,
            handler: None,
            agents: None,
            detectors: Vec::new(),
            builtin_detectors: true,
        }
    }
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: DepotConfig) -> Self {
        self.config = Some(Arc::new(RwLock::new(config)));
        self
    }

    /// Share a hot-reloadable config (see `ConfigLoader::shared`). Scoring,
    /// scenario, retry, planner, executor, and tick settings are re-read live.
    pub fn shared_config(mut self, config: Arc<RwLock<DepotConfig>>) -> Self {
        self.config = Some(config);
        self
    }

    /// Defaults to the warehouse catalog.
    pub fn catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Defaults to a [`SimulatedHandler`] built from `[simulation]`.
    pub fn handler(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Defaults to the configured roster, or the warehouse roster.
    pub fn agents(mut self, agents: Vec<Agent>) -> Self {
        self.agents = Some(agents);
        self
    }

    pub fn detector(mut self, detector: Box<dyn ScenarioDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn without_builtin_detectors(mut self) -> Self {
        self.builtin_detectors = false;
        self
    }

    pub fn build(self) -> depot_core::Result<Orchestrator> {
        let config = self.config.unwrap_or_default();
        let settings = config.read().clone();

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => warehouse::catalog()?,
        };
        if catalog.is_empty() {
            return Err(DepotError::EmptyCatalog);
        }

        let handler = self
            .handler
            .unwrap_or_else(|| Arc::new(SimulatedHandler::from_config(&settings.simulation)));
        let agents = self
            .agents
            .unwrap_or_else(|| warehouse::agents_from_config(&settings.agents));

        let store = Arc::new(WorldStateStore::new(
            settings.world.initial.clone(),
            settings.world.history_limit,
        ));
        let mut registry = AgentRegistry::from_agents(agents)?;
        registry.sync_world(&store.snapshot());

        let mut scenarios = if self.builtin_detectors {
            ScenarioEngine::new()
        } else {
            ScenarioEngine::empty()
        };
        for detector in self.detectors {
            scenarios.add_detector(detector);
        }

        info!(
            actions = catalog.len(),
            agents = registry.len(),
            detectors = ?scenarios.names(),
            "orchestrator initialised"
        );

        Ok(Orchestrator {
            inner: Arc::new(Inner {
                executor: Executor::new(Arc::clone(&store), handler),
                bus: EventBus::new(settings.orchestrator.event_capacity.max(1)),
                config,
                store,
                catalog,
                registry: RwLock::new(registry),
                scenarios,
                goals: Mutex::new(VecDeque::new()),
                suppressed: Mutex::new(HashMap::new()),
                active: Mutex::new(HashMap::new()),
                history: Mutex::new(VecDeque::new()),
                counters: Mutex::new(Counters::default()),
                lifecycle: Mutex::new(Lifecycle {
                    state: SystemState::Stopped,
                    started_at: None,
                    tick_token: None,
                    tick_handle: None,
                }),
            }),
        })
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Start the monitoring loop. Returns `false` if already running.
    pub fn start(&self) -> bool {
        let mut lifecycle = self.inner.lifecycle.lock();
        if lifecycle.state == SystemState::Running {
            return false;
        }
        lifecycle.state = SystemState::Running;
        lifecycle.started_at = Some(Instant::now());

        let token = CancellationToken::new();
        let this = self.clone();
        let loop_token = token.clone();
        lifecycle.tick_handle = Some(tokio::spawn(async move { this.run_loop(loop_token).await }));
        lifecycle.tick_token = Some(token);
        drop(lifecycle);

        self.inner.bus.publish(Event::SystemStarted);
        info!("system started");
        true
    }

    /// Cancel every executing plan, halt the tick, and wait for execution
    /// tasks to wind down. In-flight handler side effects are left to finish.
    /// Returns `false` if already stopped.
    pub async fn stop(&self) -> bool {
        let (tick_token, tick_handle) = {
            let mut lifecycle = self.inner.lifecycle.lock();
            if lifecycle.state == SystemState::Stopped {
                return false;
            }
            lifecycle.state = SystemState::Stopped;
            lifecycle.started_at = None;
            (lifecycle.tick_token.take(), lifecycle.tick_handle.take())
        };

        if let Some(token) = tick_token {
            token.cancel();
        }
        if let Some(handle) = tick_handle {
            if let Err(e) = handle.await {
                error!(error = %e, "monitoring loop ended abnormally");
            }
        }

        let drained: Vec<ActivePlan> = self.inner.active.lock().drain().map(|(_, entry)| entry).collect();
        let cancelled = drained.len();
        let mut handles = Vec::with_capacity(cancelled);
        for entry in drained {
            entry.plan.write().cancel("system stopped");
            entry.token.cancel();
            if let Some(handle) = entry.handle {
                handles.push(handle);
            }
        }
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "plan task ended abnormally");
            }
        }

        self.inner.bus.publish(Event::SystemStopped);
        info!(cancelled, "system stopped");
        true
    }

    pub fn state(&self) -> SystemState {
        self.inner.lifecycle.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SystemState::Running
    }

    async fn run_loop(self, token: CancellationToken) {
        let mut period = self.tick_interval();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_ms = period.as_millis() as u64, "monitoring loop started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    self.tick();

                    let configured = self.tick_interval();
                    if configured != period {
                        info!(
                            from_ms = period.as_millis() as u64,
                            to_ms = configured.as_millis() as u64,
                            "tick interval changed"
                        );
                        period = configured;
                        interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    }
                }
            }
        }
        info!("monitoring loop stopped");
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.inner.config.read().orchestrator.tick_interval_ms.max(1))
    }

    /// One monitoring pass: scenario detection, then the assignment sweep.
    /// Does nothing while stopped.
    pub fn tick(&self) -> Option<TickSummary> {
        if !self.is_running() {
            debug!("tick skipped, system stopped");
            return None;
        }
        let tick = {
            let mut counters = self.inner.counters.lock();
            counters.ticks += 1;
            counters.ticks
        };
        self.inner.bus.publish(Event::Tick {
            count: tick,
            timestamp: Utc::now(),
        });

        let detected = self.detect_scenarios();
        let assigned = self.assign_pending();
        let pending = self.inner.goals.lock().len();
        debug!(tick, detected = detected.len(), assigned, pending, "tick complete");

        Some(TickSummary {
            tick,
            detected,
            assigned,
            pending,
        })
    }

    // ── Goals ──────────────────────────────────────────────────

    /// Queue a goal. While running, an assignment sweep follows immediately.
    pub fn submit_goal(&self, goal: Goal) -> depot_core::Result<GoalId> {
        if goal.target_state.is_empty() {
            return Err(DepotError::GoalRejected(format!(
                "goal '{}' has no target state",
                goal.name
            )));
        }
        let max_pending = self.inner.config.read().orchestrator.max_pending_goals;
        let goal_id = goal.id;
        {
            let mut goals = self.inner.goals.lock();
            let known = goals.iter().any(|p| p.goal.id == goal_id)
                || self.inner.active.lock().values().any(|a| a.goal.id == goal_id);
            if known {
                return Err(DepotError::GoalRejected(format!("goal {goal_id} already submitted")));
            }
            if goals.len() >= max_pending {
                return Err(DepotError::GoalRejected(format!(
                    "pending goal queue is full ({max_pending})"
                )));
            }
            info!(%goal_id, name = %goal.name, priority = goal.priority, "goal submitted");
            self.inner.bus.publish(Event::GoalSubmitted {
                goal_id,
                name: goal.name.clone(),
                priority: goal.priority,
            });
            goals.push_back(PendingGoal::new(goal));
        }

        if self.is_running() {
            self.assign_pending();
        }
        Ok(goal_id)
    }

    /// Drop a goal that has not been assigned yet. Goals already running are
    /// stopped through [`Orchestrator::cancel_plan`] instead.
    pub fn withdraw_goal(&self, goal_id: GoalId) -> depot_core::Result<PendingGoal> {
        let mut goals = self.inner.goals.lock();
        let pos = goals
            .iter()
            .position(|p| p.goal.id == goal_id)
            .ok_or_else(|| DepotError::GoalNotFound(goal_id.to_string()))?;
        let Some(withdrawn) = goals.remove(pos) else {
            return Err(DepotError::GoalNotFound(goal_id.to_string()));
        };
        info!(%goal_id, "goal withdrawn");
        self.inner.bus.publish(Event::GoalAbandoned {
            goal_id,
            attempts: withdrawn.attempts,
            reason: "withdrawn".into(),
        });
        Ok(withdrawn)
    }

    pub fn pending_goals(&self) -> Vec<PendingGoal> {
        self.inner.goals.lock().iter().cloned().collect()
    }

    fn detect_scenarios(&self) -> Vec<String> {
        let world = self.inner.store.snapshot();
        let (scenarios, max_pending) = {
            let config = self.inner.config.read();
            (config.scenarios.clone(), config.orchestrator.max_pending_goals)
        };
        let found = self.inner.scenarios.detect(&world.state, &scenarios);
        if found.is_empty() {
            return Vec::new();
        }

        let mut detected = Vec::new();
        let mut goals = self.inner.goals.lock();
        for goal in found {
            let scenario = goal.scenario.clone().unwrap_or_default();
            let queued = goals
                .iter()
                .any(|p| p.goal.scenario.as_deref() == Some(scenario.as_str()));
            let executing = self
                .inner
                .active
                .lock()
                .values()
                .any(|a| a.goal.scenario.as_deref() == Some(scenario.as_str()));
            if queued || executing {
                debug!(%scenario, "scenario already in flight");
                continue;
            }
            {
                let mut suppressed = self.inner.suppressed.lock();
                match suppressed.get(&scenario) {
                    Some(&version) if world.version <= version => {
                        debug!(%scenario, version, "scenario abandoned, waiting for the world to change");
                        continue;
                    }
                    Some(_) => {
                        suppressed.remove(&scenario);
                    }
                    None => {}
                }
            }
            if goals.len() >= max_pending {
                warn!(%scenario, "pending goal queue is full, scenario goal dropped");
                break;
            }

            info!(%scenario, goal_id = %goal.id, name = %goal.name, "scenario detected, goal synthesized");
            self.inner.bus.publish(Event::ScenarioDetected {
                scenario: scenario.clone(),
                goal_id: goal.id,
            });
            self.inner.bus.publish(Event::GoalSubmitted {
                goal_id: goal.id,
                name: goal.name.clone(),
                priority: goal.priority,
            });
            goals.push_back(PendingGoal::new(goal));
            detected.push(scenario);
        }
        detected
    }

    /// Try to place every queued goal, highest priority first (FIFO within a
    /// priority). Returns the number of plans launched.
    fn assign_pending(&self) -> usize {
        let config = self.inner.config.read().clone();
        let planner = Planner::new(PlannerOptions::from(&config.planner));
        let execution = ExecutionOptions::from(&config.executor);
        let world = self.inner.store.snapshot();

        let mut goals = self.inner.goals.lock();
        goals
            .make_contiguous()
            .sort_by_key(|pending| Reverse(pending.goal.priority));

        let mut waiting = VecDeque::with_capacity(goals.len());
        let mut assigned = 0;
        while let Some(mut pending) = goals.pop_front() {
            let goal_id = pending.goal.id;
            if pending.goal.is_satisfied_by(&world.state) {
                self.retire_satisfied(&pending.goal);
                continue;
            }

            let candidates: Vec<Agent> = self
                .inner
                .registry
                .read()
                .ranked_agents(&pending.goal, config.scoring.capability_bonus)
                .into_iter()
                .cloned()
                .collect();
            if candidates.is_empty() {
                debug!(%goal_id, category = %pending.goal.category(), "no eligible agent, goal stays queued");
                waiting.push_back(pending);
                continue;
            }

            // The first candidate whose actions reach the goal gets it.
            let mut first_failure: Option<(String, PlanningFailure)> = None;
            let mut planned = None;
            for agent in &candidates {
                let actions: Vec<Action> = self.inner.catalog.for_capabilities(&agent.capabilities);
                match planner.plan(&pending.goal, &world.state, &actions, &agent.id) {
                    Ok(plan) => {
                        planned = Some(plan);
                        break;
                    }
                    Err(PlanningFailure::AlreadySatisfied) => {
                        first_failure = None;
                        break;
                    }
                    Err(failure) => {
                        debug!(%goal_id, agent = %agent.id, reason = %failure, "agent cannot plan goal");
                        first_failure.get_or_insert((agent.id.clone(), failure));
                    }
                }
            }

            if let Some(plan) = planned {
                let agent_id = plan.agent_id.clone();
                match self.launch(pending.goal.clone(), plan, execution) {
                    Ok(true) => assigned += 1,
                    Ok(false) => waiting.push_back(pending),
                    Err(e) => {
                        warn!(%goal_id, agent = %agent_id, error = %e, "could not hand plan to agent");
                        waiting.push_back(pending);
                    }
                }
                continue;
            }
            let Some((agent_id, failure)) = first_failure else {
                self.retire_satisfied(&pending.goal);
                continue;
            };

            pending.attempts += 1;
            warn!(
                %goal_id,
                agent = %agent_id,
                candidates = candidates.len(),
                attempts = pending.attempts,
                reason = %failure,
                "planning failed"
            );
            self.inner.bus.publish(Event::PlanningFailed {
                goal_id,
                agent_id,
                reason: failure.to_string(),
            });
            if pending.attempts > config.orchestrator.max_goal_retries {
                warn!(%goal_id, attempts = pending.attempts, "goal abandoned after repeated planning failures");
                if let Some(scenario) = &pending.goal.scenario {
                    self.inner.suppressed.lock().insert(scenario.clone(), world.version);
                }
                self.inner.bus.publish(Event::GoalAbandoned {
                    goal_id,
                    attempts: pending.attempts,
                    reason: failure.to_string(),
                });
            } else {
                waiting.push_back(pending);
            }
        }
        *goals = waiting;
        assigned
    }

    fn retire_satisfied(&self, goal: &Goal) {
        info!(goal_id = %goal.id, name = %goal.name, "goal already satisfied, retired without a plan");
        self.inner.bus.publish(Event::GoalSatisfied { goal_id: goal.id });
    }

    // ── Plans ──────────────────────────────────────────────────

    /// Bind `plan` to its agent and spawn its execution. Returns `Ok(false)`
    /// when the system stopped in the meantime; the goal then stays queued.
    fn launch(&self, goal: Goal, plan: Plan, options: ExecutionOptions) -> depot_core::Result<bool> {
        // Held until the plan is registered so `stop` cannot miss it.
        let lifecycle = self.inner.lifecycle.lock();
        if lifecycle.state != SystemState::Running {
            debug!(goal_id = %goal.id, "system stopped, plan not launched");
            return Ok(false);
        }

        let plan_id = plan.id;
        let agent_id = plan.agent_id.clone();
        self.inner.registry.write().bind_plan(&agent_id, plan_id)?;

        info!(
            goal_id = %goal.id,
            %plan_id,
            agent = %agent_id,
            actions = ?plan.action_names(),
            cost = plan.cost,
            "goal assigned"
        );
        self.inner.bus.publish(Event::GoalAssigned {
            goal_id: goal.id,
            agent_id: agent_id.clone(),
            plan_id,
        });
        self.inner.bus.publish(Event::PlanStarted {
            plan_id,
            agent_id,
            steps: plan.actions.len(),
        });

        let shared: SharedPlan = Arc::new(RwLock::new(plan));
        let token = CancellationToken::new();
        self.inner.active.lock().insert(
            plan_id,
            ActivePlan {
                plan: Arc::clone(&shared),
                goal,
                token: token.clone(),
                handle: None,
            },
        );

        let this = self.clone();
        let handle = tokio::spawn(async move {
            let observer = PlanObserver { orchestrator: &this };
            let report = this
                .inner
                .executor
                .execute(Arc::clone(&shared), &options, token, &observer)
                .await;
            this.finish_plan(&shared, &report);
        });
        if let Some(entry) = self.inner.active.lock().get_mut(&plan_id) {
            entry.handle = Some(handle);
        }
        drop(lifecycle);
        Ok(true)
    }

    fn finish_plan(&self, plan: &SharedPlan, report: &ExecutionReport) {
        let finished = plan.read().clone();
        self.inner.active.lock().remove(&finished.id);
        {
            let mut registry = self.inner.registry.write();
            registry.release(&finished.agent_id, finished.id);
            registry.record_outcome(&finished.agent_id, finished.status, report.duration_ms);
        }
        {
            let mut counters = self.inner.counters.lock();
            match finished.status {
                PlanStatus::Completed => counters.completed += 1,
                PlanStatus::Failed => counters.failed += 1,
                PlanStatus::Cancelled => counters.cancelled += 1,
                PlanStatus::Pending | PlanStatus::Executing => {}
            }
        }

        let limit = self.inner.config.read().orchestrator.plan_history;
        {
            let mut history = self.inner.history.lock();
            history.push_back(finished.clone());
            while history.len() > limit {
                history.pop_front();
            }
        }

        info!(
            goal_id = %finished.goal_id,
            plan_id = %finished.id,
            agent = %finished.agent_id,
            status = %finished.status,
            "goal retired"
        );
        self.inner.bus.publish(Event::GoalRetired {
            goal_id: finished.goal_id,
            status: finished.status,
        });

        if self.is_running() {
            self.assign_pending();
        }
    }

    /// Cancel one executing plan. Applied effects stay applied.
    pub fn cancel_plan(&self, plan_id: PlanId, reason: &str) -> bool {
        let active = self.inner.active.lock();
        let Some(entry) = active.get(&plan_id) else {
            return false;
        };
        let cancelled = entry.plan.write().cancel(reason);
        entry.token.cancel();
        info!(%plan_id, reason, "plan cancelled");
        cancelled
    }

    /// Plans currently owned by an agent, oldest first.
    pub fn active_plans(&self) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self
            .inner
            .active
            .lock()
            .values()
            .map(|entry| entry.plan.read().clone())
            .collect();
        plans.sort_by_key(|p| p.created_at);
        plans
    }

    /// Retired plans, oldest first.
    pub fn plan_history(&self) -> Vec<Plan> {
        self.inner.history.lock().iter().cloned().collect()
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.inner.catalog
    }

    // ── Agents ─────────────────────────────────────────────────

    pub fn add_agent(&self, mut agent: Agent) -> depot_core::Result<()> {
        agent.current_plan = None;
        let agent_id = agent.id.clone();
        {
            let mut registry = self.inner.registry.write();
            registry.add(agent)?;
            registry.sync_world(&self.inner.store.snapshot());
        }
        self.inner.bus.publish(Event::AgentAdded { agent_id });
        if self.is_running() {
            self.assign_pending();
        }
        Ok(())
    }

    /// Remove an agent, cancelling its plan first.
    pub fn remove_agent(&self, agent_id: &str) -> bool {
        let current = self
            .inner
            .registry
            .read()
            .get(agent_id)
            .and_then(|a| a.current_plan);
        if let Some(plan_id) = current {
            self.cancel_plan(plan_id, "agent removed");
        }

        let removed = self.inner.registry.write().remove(agent_id).is_some();
        if removed {
            self.inner.bus.publish(Event::AgentRemoved {
                agent_id: agent_id.to_string(),
            });
        }
        removed
    }

    pub fn set_agent_active(&self, agent_id: &str, active: bool) -> depot_core::Result<()> {
        self.inner.registry.write().set_active(agent_id, active)?;
        info!(agent = agent_id, active, "agent availability changed");
        Ok(())
    }

    pub fn list_agents(&self) -> Vec<Agent> {
        self.inner.registry.read().list().to_vec()
    }

    pub fn get_agent(&self, agent_id: &str) -> Option<Agent> {
        self.inner.registry.read().get(agent_id).cloned()
    }

    // ── World ──────────────────────────────────────────────────

    pub fn world_state_snapshot(&self) -> WorldState {
        self.inner.store.snapshot().state.clone()
    }

    pub fn world_snapshot(&self) -> Arc<WorldSnapshot> {
        self.inner.store.snapshot()
    }

    pub fn world_history(&self) -> Vec<WorldChange> {
        self.inner.store.history()
    }

    pub fn subscribe_world(&self) -> watch::Receiver<Arc<WorldSnapshot>> {
        self.inner.store.subscribe()
    }

    /// Apply an external event (new orders, a scan, a breakdown) to the world.
    pub fn apply_world_effects(&self, effects: &WorldState, source: &str) -> Arc<WorldSnapshot> {
        let snapshot = self.inner.store.apply(effects, source);
        self.inner.registry.write().sync_world(&snapshot);
        info!(version = snapshot.version, source, keys = ?effects.keys().collect::<Vec<_>>(), "world updated");
        self.inner.bus.publish(Event::WorldStateChanged {
            version: snapshot.version,
            keys: effects.keys().cloned().collect(),
        });
        snapshot
    }

    // ── Introspection ──────────────────────────────────────────

    pub fn status(&self) -> SystemStatus {
        let (state, uptime_secs) = {
            let lifecycle = self.inner.lifecycle.lock();
            (
                lifecycle.state,
                lifecycle.started_at.map(|t| t.elapsed().as_secs()).unwrap_or(0),
            )
        };
        let (active_agents, busy_agents) = {
            let registry = self.inner.registry.read();
            (registry.active_count(), registry.busy_count())
        };
        let pending_goals = self.inner.goals.lock().len();
        let running_plans = self.inner.active.lock().len();
        let counters = self.inner.counters.lock();
        SystemStatus {
            state,
            active_agents,
            busy_agents,
            running_plans,
            completed_plans: counters.completed,
            failed_plans: counters.failed,
            cancelled_plans: counters.cancelled,
            pending_goals,
            world_version: self.inner.store.version(),
            ticks: counters.ticks,
            uptime_secs,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    pub fn config(&self) -> DepotConfig {
        self.inner.config.read().clone()
    }
}

/// Forwards executor progress to the registry and the event bus.
struct PlanObserver<'a> {
    orchestrator: &'a Orchestrator,
}

impl ExecutionObserver for PlanObserver<'_> {
    fn on_action_complete(&self, ctx: &ActionContext, action: &Action, _outcome: &ActionOutcome) {
        let inner = &self.orchestrator.inner;
        let snapshot = inner.store.snapshot();
        inner.registry.write().sync_world(&snapshot);
        inner.bus.publish(Event::ActionCompleted {
            plan_id: ctx.plan_id,
            agent_id: ctx.agent_id.clone(),
            action: action.name.clone(),
            step: ctx.step,
        });
        inner.bus.publish(Event::WorldStateChanged {
            version: snapshot.version,
            keys: action.effects.keys().cloned().collect(),
        });
    }

    fn on_plan_complete(&self, report: &ExecutionReport) {
        self.orchestrator.inner.bus.publish(Event::PlanFinished {
            plan_id: report.plan_id,
            agent_id: report.agent_id.clone(),
            status: report.status,
            reason: (!report.success()).then(|| report.message.clone()),
        });
    }
}
