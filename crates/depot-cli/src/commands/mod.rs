use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use console::style;
use std::path::PathBuf;

use depot_config::{ConfigLoader, DepotConfig, WarningSeverity};
use depot_core::{DepotError, StateValue};
use depot_planner::{GoalCategory, GoalContext};
use depot_runtime::{AgentRegistry, warehouse};

mod inspect;
mod run;
mod setup;

pub use setup::STARTER_CONFIG;

/// 📦 Depot: goal-oriented planning for warehouse agents
#[derive(Parser)]
#[command(name = "depot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to depot.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the orchestrator against the simulated warehouse floor
    Run {
        /// Stop after this many seconds (runs until Ctrl-C if omitted)
        #[arg(short, long)]
        duration: Option<u64>,
        /// External world changes applied at startup, as key=value pairs
        #[arg(short, long, value_parser = parse_key_val)]
        inject: Vec<(String, String)>,
    },
    /// Plan one goal against the configured world and print the actions
    Plan {
        /// Target conditions as key=value pairs (e.g. lowStockItems=[])
        #[arg(short, long, value_parser = parse_key_val, required = true)]
        goal: Vec<(String, String)>,
        /// Overrides on top of the configured initial world
        #[arg(short, long, value_parser = parse_key_val)]
        world: Vec<(String, String)>,
        /// Goal category used to pick an agent
        #[arg(long, value_enum, default_value = "general")]
        category: Category,
        /// Plan for this agent instead of the best-scoring one
        #[arg(short, long)]
        agent: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the action catalog
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the agent roster
    Agents {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and roster coverage
    Doctor,
    /// Show version and build info
    Version,
    /// Initialize a new depot.toml in the current or home directory
    Init {
        /// Create in current directory instead of ~/.depot/
        #[arg(long)]
        local: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Category {
    OrderFulfillment,
    InventoryOptimization,
    QualityAssurance,
    EquipmentMaintenance,
    General,
}

impl Category {
    fn context(self) -> GoalContext {
        match self {
            Self::OrderFulfillment => GoalContext::OrderFulfillment { order_ids: vec![] },
            Self::InventoryOptimization => GoalContext::InventoryOptimization { skus: vec![] },
            Self::QualityAssurance => GoalContext::QualityAssurance { issues: vec![] },
            Self::EquipmentMaintenance => GoalContext::EquipmentMaintenance { equipment_id: None },
            Self::General => GoalContext::General,
        }
    }
}

/// Parse "key=value" CLI arguments.
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    let key = s[..pos].trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), s[pos + 1..].to_string()))
}

/// Infer a world-state value: `true`/`false`, a number, a `[a, b]` list, or
/// plain text.
pub fn parse_state_value(raw: &str) -> StateValue {
    let raw = raw.trim();
    match raw {
        "true" => return StateValue::Bool(true),
        "false" => return StateValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<f64>() {
        return StateValue::Number(n);
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| item.trim().trim_matches('"').to_string())
            .filter(|item| !item.is_empty())
            .collect();
        return StateValue::List(items);
    }
    StateValue::Text(raw.trim_matches('"').to_string())
}

impl Cli {
    pub async fn run(self) -> depot_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(&config.logging.level)
        };
        init_tracing(&config.logging.format, log_level);

        match self.command {
            Commands::Run { duration, inject } => run::cmd_run(config_loader, duration, inject).await,
            Commands::Plan {
                goal,
                world,
                category,
                agent,
                json,
            } => inspect::cmd_plan(config, goal, world, category, agent, json),
            Commands::Catalog { json } => inspect::cmd_catalog(json),
            Commands::Agents { json } => inspect::cmd_agents(config, json),
            Commands::Config { json } => Self::cmd_config(config, json),
            Commands::Doctor => Self::cmd_doctor(config),
            Commands::Version => Self::cmd_version(),
            Commands::Init { local } => setup::cmd_init(local),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: DepotConfig, json: bool) -> depot_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| DepotError::Config(format!("cannot render config: {e}")))?;
            println!("{rendered}");
        }
        Ok(())
    }

    fn cmd_doctor(config: DepotConfig) -> depot_core::Result<()> {
        println!("🩺 Depot Doctor: Configuration Audit");
        println!();

        let warnings = match config.validate() {
            Ok(w) => w,
            Err(e) => {
                println!("{e}");
                return Ok(());
            }
        };

        let mut warn_count = 0;
        let mut info_count = 0;
        for w in &warnings {
            println!("  {w}");
            match w.severity {
                WarningSeverity::Warning => warn_count += 1,
                WarningSeverity::Info => info_count += 1,
                WarningSeverity::Error => {}
            }
        }

        // Every scenario category needs somebody qualified to handle it
        let registry = AgentRegistry::from_agents(warehouse::agents_from_config(&config.agents))?;
        let categories = [
            GoalCategory::OrderFulfillment,
            GoalCategory::InventoryOptimization,
            GoalCategory::QualityAssurance,
            GoalCategory::EquipmentMaintenance,
        ];
        let mut covered = 0;
        for category in categories {
            if registry.list().iter().any(|a| a.is_active && a.qualifies_for(category)) {
                covered += 1;
            } else {
                println!(
                    "  ⚠️  agents: no active agent can take {category} goals (needs {})",
                    category.required_capabilities().join(", ")
                );
                warn_count += 1;
            }
        }

        println!();
        println!(
            "  ✅ {covered}/{} categories covered, ⚠️  {warn_count} warnings, 💡 {info_count} suggestions",
            categories.len()
        );
        Ok(())
    }

    fn cmd_version() -> depot_core::Result<()> {
        println!("📦 Depot v{}", env!("CARGO_PKG_VERSION"));
        println!("   Rust edition: 2024");
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: {}", style("debug").yellow());
        #[cfg(not(debug_assertions))]
        println!("   Profile: {}", style("release").green());
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> depot_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "depot", &mut std::io::stdout());
        Ok(())
    }
}

fn init_tracing(format: &str, level: &str) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    match format {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .json()
            .with_target(true)
            .init(),
        "compact" => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .compact()
            .with_target(false)
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .pretty()
            .with_target(false)
            .init(),
    }
}
