//! Plan execution.
//!
//! The executor walks a plan from its cursor, re-checking each action's
//! preconditions against the live store, performing it through an
//! [`ActionHandler`], and applying its effects. Effects already applied are
//! never rolled back.

use depot_config::schema::ExecutorConfig;
use depot_core::{AgentId, DepotError, GoalId, PlanId, PlanStatus};
use depot_planner::{Action, Plan};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handler::{ActionContext, ActionHandler, ActionOutcome};
use crate::store::WorldStateStore;

/// A plan shared between its executing task and readers such as status calls.
pub type SharedPlan = Arc<RwLock<Plan>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Budget for the whole plan. Exceeding it cancels the plan.
    pub plan_timeout: Duration,
    /// Default budget for one action. Exceeding it fails the plan.
    pub action_timeout: Duration,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self::from(&ExecutorConfig::default())
    }
}

impl From<&ExecutorConfig> for ExecutionOptions {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            plan_timeout: Duration::from_millis(config.plan_timeout_ms),
            action_timeout: Duration::from_millis(config.action_timeout_ms),
        }
    }
}

/// Callbacks fired as a plan progresses.
pub trait ExecutionObserver: Send + Sync {
    fn on_action_complete(&self, _ctx: &ActionContext, _action: &Action, _outcome: &ActionOutcome) {}

    fn on_plan_complete(&self, _report: &ExecutionReport) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// Final word on one plan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub plan_id: PlanId,
    pub goal_id: GoalId,
    pub agent_id: AgentId,
    pub status: PlanStatus,
    pub message: String,
    pub steps_completed: usize,
    pub total_steps: usize,
    pub duration_ms: u64,
}

impl ExecutionReport {
    pub fn success(&self) -> bool {
        self.status == PlanStatus::Completed
    }
}

pub struct Executor {
    store: Arc<WorldStateStore>,
    handler: Arc<dyn ActionHandler>,
}

impl Executor {
    pub fn new(store: Arc<WorldStateStore>, handler: Arc<dyn ActionHandler>) -> Self {
        Self { store, handler }
    }

    pub fn store(&self) -> &Arc<WorldStateStore> {
        &self.store
    }

    /// Run `plan` to a terminal state.
    ///
    /// The plan fails on a violated precondition, a handler error, or an action
    /// timeout. It is cancelled when `cancel` fires or the plan budget runs out.
    /// A plan that is not `pending` is left untouched.
    pub async fn execute(
        &self,
        plan: SharedPlan,
        options: &ExecutionOptions,
        cancel: CancellationToken,
        observer: &dyn ExecutionObserver,
    ) -> ExecutionReport {
        let started = Instant::now();
        let (plan_id, agent_id, steps) = {
            let mut p = plan.write();
            if !p.start() {
                drop(p);
                return self.report(&plan, started, "plan was not pending".into());
            }
            (p.id, p.agent_id.clone(), p.actions.len())
        };
        info!(%plan_id, agent = %agent_id, steps, "executing plan");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DepotError::Cancelled("cancellation requested".into())),
            _ = tokio::time::sleep(options.plan_timeout) => Err(DepotError::PlanTimeout {
                plan: plan_id.to_string(),
                timeout_ms: options.plan_timeout.as_millis() as u64,
            }),
            r = self.run_steps(&plan, options, &cancel, observer) => r,
        };

        let message = {
            let mut p = plan.write();
            match &result {
                Ok(()) => {
                    p.complete();
                    "plan completed".to_string()
                }
                Err(e @ (DepotError::Cancelled(_) | DepotError::PlanTimeout { .. })) => {
                    p.cancel(e.to_string());
                    e.to_string()
                }
                Err(e) => {
                    p.fail(e.to_string());
                    e.to_string()
                }
            }
        };

        let report = self.report(&plan, started, message);
        match report.status {
            PlanStatus::Completed => info!(%plan_id, agent = %agent_id, duration_ms = report.duration_ms, "plan completed"),
            status => warn!(%plan_id, agent = %agent_id, %status, reason = %report.message, "plan did not complete"),
        }
        observer.on_plan_complete(&report);
        report
    }

    async fn run_steps(
        &self,
        plan: &SharedPlan,
        options: &ExecutionOptions,
        cancel: &CancellationToken,
        observer: &dyn ExecutionObserver,
    ) -> depot_core::Result<()> {
        loop {
            let (action, ctx) = {
                let p = plan.read();
                if p.is_terminal() {
                    return Err(DepotError::Cancelled(
                        p.failure_reason.clone().unwrap_or_else(|| "plan retired".into()),
                    ));
                }
                let Some(action) = p.next_action().cloned() else {
                    return Ok(());
                };
                let ctx = ActionContext {
                    plan_id: p.id,
                    goal_id: p.goal_id,
                    agent_id: p.agent_id.clone(),
                    step: p.cursor + 1,
                    world: self.store.snapshot(),
                    cancellation_token: cancel.clone(),
                };
                (action, ctx)
            };

            if let Some(condition) = action.violated_precondition(&ctx.world.state) {
                return Err(DepotError::PreconditionViolated {
                    step: ctx.step,
                    action: action.name.clone(),
                    condition: condition.to_string(),
                });
            }

            let timeout = action
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(options.action_timeout);
            let outcome = self.perform(&action, &ctx, timeout).await?;

            self.store
                .apply(&action.effects, &format!("{}/{}", ctx.agent_id, action.name));
            plan.write().advance();
            debug!(plan_id = %ctx.plan_id, action = %action.name, step = ctx.step, "action completed");
            observer.on_action_complete(&ctx, &action, &outcome);
        }
    }

    /// Run the handler on its own task so that dropping this future (plan
    /// cancelled or timed out) detaches the side effect instead of aborting it.
    async fn perform(
        &self,
        action: &Action,
        ctx: &ActionContext,
        timeout: Duration,
    ) -> depot_core::Result<ActionOutcome> {
        let handler = Arc::clone(&self.handler);
        let task_action = action.clone();
        let task_ctx = ctx.clone();
        let task = tokio::spawn(async move { handler.perform(&task_action, &task_ctx).await });

        match tokio::time::timeout(timeout, task).await {
            Err(_) => Err(DepotError::ActionTimeout {
                action: action.name.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Ok(Err(join)) => Err(DepotError::ActionFailed {
                action: action.name.clone(),
                reason: join.to_string(),
            }),
            Ok(Ok(Err(e @ (DepotError::ActionFailed { .. } | DepotError::Cancelled(_))))) => Err(e),
            Ok(Ok(Err(e))) => Err(DepotError::ActionFailed {
                action: action.name.clone(),
                reason: e.to_string(),
            }),
            Ok(Ok(Ok(outcome))) => Ok(outcome),
        }
    }

    fn report(&self, plan: &SharedPlan, started: Instant, message: String) -> ExecutionReport {
        let p = plan.read();
        ExecutionReport {
            plan_id: p.id,
            goal_id: p.goal_id,
            agent_id: p.agent_id.clone(),
            status: p.status,
            message: p.failure_reason.clone().unwrap_or(message),
            steps_completed: p.cursor,
            total_steps: p.actions.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}
