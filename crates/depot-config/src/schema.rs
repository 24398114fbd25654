use depot_core::{AgentKind, WorldState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Root configuration, maps to `depot.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepotConfig {
    pub planner: PlannerConfig,
    pub executor: ExecutorConfig,
    pub orchestrator: OrchestratorConfig,
    pub scoring: ScoringConfig,
    pub scenarios: ScenariosConfig,
    pub world: WorldConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
    /// Agent roster. Empty means the built-in warehouse roster.
    pub agents: Vec<AgentConfig>,
}

// ── Planner ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum number of actions in a plan.
    pub max_depth: usize,
    /// Wall-clock budget for a single search, in milliseconds.
    pub timeout_ms: u64,
    /// Maximum search nodes expanded before giving up.
    pub max_expansions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            timeout_ms: 1_000,
            max_expansions: 50_000,
        }
    }
}

// ── Executor ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Overall budget for one plan. Exceeding it cancels the plan.
    pub plan_timeout_ms: u64,
    /// Default budget for one action (actions may override). Exceeding it fails the plan.
    pub action_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            plan_timeout_ms: 300_000,
            action_timeout_ms: 30_000,
        }
    }
}

// ── Orchestrator ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Monitoring tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Planning failures tolerated per goal before it is abandoned.
    pub max_goal_retries: u32,
    /// Goals waiting for an agent before new submissions are rejected.
    pub max_pending_goals: usize,
    /// Retired plans kept for inspection.
    pub plan_history: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5_000,
            max_goal_retries: 5,
            max_pending_goals: 256,
            plan_history: 100,
            event_capacity: 1024,
        }
    }
}

// ── Scoring ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score added per preferred capability an agent holds for a goal category.
    pub capability_bonus: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            capability_bonus: 10,
        }
    }
}

// ── Scenarios ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenariosConfig {
    /// Restock when `lowStockItems` is non-empty.
    pub low_stock: bool,
    /// Clear the backlog when `ordersInQueue` grows past the threshold.
    pub order_backlog: bool,
    pub order_backlog_threshold: usize,
    /// Quarantine when `qualityIssues` is non-empty.
    pub quality_issues: bool,
    /// Repair when `equipmentOperational` is false.
    pub equipment_fault: bool,
}

impl Default for ScenariosConfig {
    fn default() -> Self {
        Self {
            low_stock: true,
            order_backlog: true,
            order_backlog_threshold: 10,
            quality_issues: true,
            equipment_fault: true,
        }
    }
}

// ── World ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Initial world state, e.g. `equipmentOperational = true`.
    pub initial: WorldState,
    /// Number of applied changes kept in the store's change log.
    pub history_limit: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial: WorldState::new()
                .with("equipmentOperational", true)
                .with("ordersInQueue", Vec::<String>::new())
                .with("lowStockItems", Vec::<String>::new())
                .with("qualityIssues", Vec::<String>::new()),
            history_limit: 256,
        }
    }
}

// ── Simulation ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Latency of simulated actions that declare no `durationMs`.
    pub action_latency_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            action_latency_ms: 250,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Agents ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: AgentKind,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

// ── Default for root ───────────────────────────────────────────

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            executor: ExecutorConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            scoring: ScoringConfig::default(),
            scenarios: ScenariosConfig::default(),
            world: WorldConfig::default(),
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
            agents: vec![],
        }
    }
}

fn default_true() -> bool {
    true
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl DepotConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Planner bounds ───
        if self.planner.max_depth == 0 {
            warnings.push(ConfigWarning {
                field: "planner.max_depth".into(),
                message: "max_depth is 0; no plan can ever be found".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 10".into()),
            });
        } else if self.planner.max_depth > 50 {
            warnings.push(ConfigWarning {
                field: "planner.max_depth".into(),
                message: format!("max_depth {} is very deep", self.planner.max_depth),
                severity: WarningSeverity::Warning,
                hint: Some("Deep searches are bounded mostly by planner.timeout_ms".into()),
            });
        }
        if self.planner.timeout_ms == 0 {
            warnings.push(ConfigWarning {
                field: "planner.timeout_ms".into(),
                message: "timeout_ms is 0; every search times out immediately".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 1000".into()),
            });
        }
        if self.planner.max_expansions == 0 {
            warnings.push(ConfigWarning {
                field: "planner.max_expansions".into(),
                message: "max_expansions is 0".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 50000".into()),
            });
        }

        // ── Executor budgets ───
        if self.executor.plan_timeout_ms == 0 || self.executor.action_timeout_ms == 0 {
            warnings.push(ConfigWarning {
                field: "executor".into(),
                message: "timeouts must be positive".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        } else if self.executor.action_timeout_ms > self.executor.plan_timeout_ms {
            warnings.push(ConfigWarning {
                field: "executor.action_timeout_ms".into(),
                message: "action timeout exceeds plan timeout; plans cancel before actions fail".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Tick interval ───
        if self.orchestrator.tick_interval_ms == 0 {
            warnings.push(ConfigWarning {
                field: "orchestrator.tick_interval_ms".into(),
                message: "tick interval is 0".into(),
                severity: WarningSeverity::Error,
                hint: Some("Default is 5000".into()),
            });
        } else if self.orchestrator.tick_interval_ms < 100 {
            warnings.push(ConfigWarning {
                field: "orchestrator.tick_interval_ms".into(),
                message: format!("tick interval {}ms is very short", self.orchestrator.tick_interval_ms),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }
        if self.orchestrator.max_pending_goals == 0 {
            warnings.push(ConfigWarning {
                field: "orchestrator.max_pending_goals".into(),
                message: "no goals can ever be queued".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }

        // ── Scoring ───
        if self.scoring.capability_bonus < 0 {
            warnings.push(ConfigWarning {
                field: "scoring.capability_bonus".into(),
                message: "negative bonus favours agents without matching skills".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Scenarios ───
        if self.scenarios.order_backlog && self.scenarios.order_backlog_threshold == 0 {
            warnings.push(ConfigWarning {
                field: "scenarios.order_backlog_threshold".into(),
                message: "threshold 0; any queued order triggers a backlog goal".into(),
                severity: WarningSeverity::Info,
                hint: None,
            });
        }

        // ── Agents ───
        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.id.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: "agents.id".into(),
                    message: "agent id is empty".into(),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            } else if !seen.insert(agent.id.as_str()) {
                warnings.push(ConfigWarning {
                    field: format!("agents.{}", agent.id),
                    message: format!("duplicate agent id '{}'", agent.id),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
            if agent.capabilities.is_empty() {
                warnings.push(ConfigWarning {
                    field: format!("agents.{}.capabilities", agent.id),
                    message: "agent has no capabilities and can only take general goals".into(),
                    severity: WarningSeverity::Warning,
                    hint: None,
                });
            }
        }

        // ── Logging ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
