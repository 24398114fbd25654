//! Backward-chaining best-first GOAP search.
//!
//! The search starts from the goal's target state and regresses it through
//! actions whose effects achieve at least one outstanding condition. A node is
//! the set of conditions that must hold before the actions chosen so far, plus
//! the accumulated cost and the action path (stored last-action-first). A node
//! whose conditions all hold in the start snapshot is a solution; its path,
//! reversed, is the plan.
//!
//! Frontier order is `cost + h`, where `h` is the number of conditions not yet
//! true in the start snapshot, scaled by `min action cost / max effects per
//! action` so it never overestimates. Ties go to the shorter path, then to the
//! lexicographically smaller sequence of registration indices.

use depot_config::schema::PlannerConfig;
use depot_core::{Condition, DepotError, WorldState};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::action::Action;
use crate::goal::Goal;
use crate::plan::Plan;

/// Why the planner could not produce a plan. None of these are fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningFailure {
    #[error("no actions available")]
    NoActions,

    #[error("goal has no target state")]
    EmptyGoal,

    #[error("goal already satisfied")]
    AlreadySatisfied,

    #[error("unreachable goal condition: {condition}")]
    Unreachable { condition: String },

    #[error("search exhausted: {reason}")]
    Exhausted { reason: String },
}

impl From<PlanningFailure> for DepotError {
    fn from(failure: PlanningFailure) -> Self {
        DepotError::Planning(failure.to_string())
    }
}

/// Search bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Maximum number of actions in a plan.
    pub max_depth: usize,
    pub timeout: Duration,
    /// Maximum nodes popped from the frontier.
    pub max_expansions: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self::from(&PlannerConfig::default())
    }
}

impl From<&PlannerConfig> for PlannerOptions {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            timeout: Duration::from_millis(config.timeout_ms),
            max_expansions: config.max_expansions,
        }
    }
}

/// Wire-friendly rendering of a planning result: `{success, plan?, message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    pub message: String,
}

impl From<Result<Plan, PlanningFailure>> for PlanResponse {
    fn from(result: Result<Plan, PlanningFailure>) -> Self {
        match result {
            Ok(plan) => Self {
                success: true,
                message: format!("plan found with {} actions", plan.actions.len()),
                plan: Some(plan),
            },
            Err(failure) => Self {
                success: false,
                plan: None,
                message: failure.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    /// Sorted, de-duplicated conditions that must hold before `path`.
    conditions: Vec<Condition>,
    cost: f64,
    /// Priority: `cost + h`.
    score: f64,
    /// Action indices, last action first.
    path: Vec<usize>,
}

impl Node {
    fn forward_path(&self) -> impl Iterator<Item = &usize> {
        self.path.iter().rev()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    /// Reversed so `BinaryHeap` pops the best node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.path.len().cmp(&self.path.len()))
            .then_with(|| other.forward_path().cmp(self.forward_path()))
    }
}

/// The GOAP planner.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    options: PlannerOptions,
}

impl Planner {
    pub fn new(options: PlannerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Search for the cheapest plan that takes `world` to the goal's target
    /// state using only `actions`. Identical inputs always yield the same
    /// action sequence.
    pub fn plan(
        &self,
        goal: &Goal,
        world: &WorldState,
        actions: &[Action],
        agent_id: &str,
    ) -> Result<Plan, PlanningFailure> {
        let indices = self.search(goal, world, actions)?;
        let sequence: Vec<Action> = indices.iter().map(|&i| actions[i].clone()).collect();
        let plan = Plan::new(goal.id, agent_id, sequence)
            .map_err(|_| PlanningFailure::Exhausted { reason: "empty plan".into() })?;
        info!(
            goal_id = %goal.id,
            agent = agent_id,
            plan_id = %plan.id,
            steps = plan.actions.len(),
            cost = plan.cost,
            "plan found"
        );
        Ok(plan)
    }

    /// Core search. Returns action indices in forward execution order.
    pub fn search(
        &self,
        goal: &Goal,
        world: &WorldState,
        actions: &[Action],
    ) -> Result<Vec<usize>, PlanningFailure> {
        if actions.is_empty() {
            return Err(PlanningFailure::NoActions);
        }
        if goal.target_state.is_empty() {
            return Err(PlanningFailure::EmptyGoal);
        }
        if goal.is_satisfied_by(world) {
            return Err(PlanningFailure::AlreadySatisfied);
        }

        let initial: Vec<Condition> = goal
            .target_state
            .iter()
            .map(|(key, req)| Condition::new(key.clone(), req.clone()))
            .collect();

        // A target condition no action can produce makes the goal unreachable.
        for condition in initial.iter().filter(|c| !c.is_satisfied_by(world)) {
            let producible = actions.iter().any(|a| {
                a.effects
                    .get(&condition.key)
                    .is_some_and(|v| condition.requirement.accepts(v))
            });
            if !producible {
                debug!(goal_id = %goal.id, %condition, "no action produces condition");
                return Err(PlanningFailure::Unreachable {
                    condition: condition.to_string(),
                });
            }
        }

        let h_scale = heuristic_scale(actions);
        let started = Instant::now();
        let mut frontier = BinaryHeap::new();
        let mut best: HashMap<String, Route> = HashMap::new();
        let mut depth_limited = false;
        let mut dead_end: Option<Condition> = None;
        let mut expansions = 0usize;

        let root = make_node(canonical(initial), 0.0, Vec::new(), world, h_scale);
        best.insert(signature(&root.conditions), Route::of(&root));
        frontier.push(root);

        while let Some(node) = frontier.pop() {
            if started.elapsed() >= self.options.timeout {
                return Err(PlanningFailure::Exhausted {
                    reason: format!("timed out after {}ms", self.options.timeout.as_millis()),
                });
            }
            expansions += 1;
            if expansions > self.options.max_expansions {
                return Err(PlanningFailure::Exhausted {
                    reason: format!("expansion limit {} reached", self.options.max_expansions),
                });
            }

            // Stale entry: a better route to the same condition set was queued later.
            let route = Route::of(&node);
            if best
                .get(&signature(&node.conditions))
                .is_some_and(|b| b.precedes(&route))
            {
                continue;
            }

            if node.conditions.iter().all(|c| c.is_satisfied_by(world)) {
                let forward: Vec<usize> = node.forward_path().copied().collect();
                if verify(goal, world, actions, &forward) {
                    debug!(goal_id = %goal.id, expansions, cost = node.cost, "search succeeded");
                    return Ok(forward);
                }
                debug!(goal_id = %goal.id, ?forward, "candidate failed forward check");
                continue;
            }

            if node.path.len() >= self.options.max_depth {
                depth_limited = true;
                continue;
            }

            let mut expanded = false;
            for (index, action) in actions.iter().enumerate() {
                let Some(conditions) = regress(&node.conditions, action) else {
                    continue;
                };
                expanded = true;
                let cost = node.cost + action.cost;
                let mut path = node.path.clone();
                path.push(index);
                let child = make_node(conditions, cost, path, world, h_scale);

                let route = Route::of(&child);
                let sig = signature(&child.conditions);
                if best.get(&sig).is_some_and(|b| !route.precedes(b)) {
                    continue;
                }
                best.insert(sig, route);
                frontier.push(child);
            }
            if !expanded && dead_end.is_none() {
                dead_end = node
                    .conditions
                    .iter()
                    .find(|c| !c.is_satisfied_by(world))
                    .cloned();
            }
        }

        if depth_limited {
            return Err(PlanningFailure::Exhausted {
                reason: format!("max depth {} reached", self.options.max_depth),
            });
        }
        let condition = dead_end
            .or_else(|| world.first_unsatisfied(&goal.target_state))
            .map(|c| c.to_string())
            .unwrap_or_default();
        debug!(goal_id = %goal.id, expansions, %condition, "frontier exhausted");
        Err(PlanningFailure::Unreachable { condition })
    }
}

/// Best known way to reach a condition set. Two routes to the same set share
/// every action still to be chosen, so comparing them by cost, then length,
/// then forward index sequence ranks the complete plans they lead to.
#[derive(Debug, Clone)]
struct Route {
    cost: f64,
    forward: Vec<usize>,
}

impl Route {
    fn of(node: &Node) -> Self {
        Self {
            cost: node.cost,
            forward: node.forward_path().copied().collect(),
        }
    }

    fn precedes(&self, other: &Route) -> bool {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.forward.len().cmp(&other.forward.len()))
            .then_with(|| self.forward.cmp(&other.forward))
            == Ordering::Less
    }
}

/// Regress `conditions` through `action`. `None` when the action achieves
/// nothing outstanding, clobbers a condition, or needs a precondition that
/// contradicts one already required.
fn regress(conditions: &[Condition], action: &Action) -> Option<Vec<Condition>> {
    let mut achieves = false;
    let mut remaining = Vec::with_capacity(conditions.len() + action.preconditions.len());

    for condition in conditions {
        match action.effects.get(&condition.key) {
            Some(value) if condition.requirement.accepts(value) => achieves = true,
            Some(_) => return None,
            None => remaining.push(condition.clone()),
        }
    }
    if !achieves {
        return None;
    }

    for (key, requirement) in &action.preconditions {
        let contradicts = remaining
            .iter()
            .any(|c| &c.key == key && c.requirement.conflicts_with(requirement));
        if contradicts {
            return None;
        }
        remaining.push(Condition::new(key.clone(), requirement.clone()));
    }
    Some(canonical(remaining))
}

fn canonical(mut conditions: Vec<Condition>) -> Vec<Condition> {
    conditions.sort_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then_with(|| a.requirement.to_string().cmp(&b.requirement.to_string()))
    });
    conditions.dedup();
    conditions
}

fn signature(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(Condition::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn make_node(
    conditions: Vec<Condition>,
    cost: f64,
    path: Vec<usize>,
    world: &WorldState,
    h_scale: f64,
) -> Node {
    let unsatisfied = conditions.iter().filter(|c| !c.is_satisfied_by(world)).count();
    Node {
        score: cost + unsatisfied as f64 * h_scale,
        conditions,
        cost,
        path,
    }
}

fn heuristic_scale(actions: &[Action]) -> f64 {
    let min_cost = actions.iter().map(|a| a.cost).fold(f64::INFINITY, f64::min);
    let max_effects = actions.iter().map(|a| a.effects.len()).max().unwrap_or(1).max(1);
    if min_cost.is_finite() {
        min_cost / max_effects as f64
    } else {
        0.0
    }
}

/// Replay the sequence forward from `world`, checking every precondition and
/// the final target state.
fn verify(goal: &Goal, world: &WorldState, actions: &[Action], sequence: &[usize]) -> bool {
    let mut state = world.clone();
    for &index in sequence {
        let action = &actions[index];
        if !action.preconditions_hold(&state) {
            return false;
        }
        state.merge(&action.effects);
    }
    goal.is_satisfied_by(&state)
}
