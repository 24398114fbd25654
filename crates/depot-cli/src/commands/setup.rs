use std::path::PathBuf;

/// Starter `depot.toml` written by `depot init`.
pub const STARTER_CONFIG: &str = r#"# 📦 Depot Configuration

[planner]
max_depth = 10
timeout_ms = 1000
# max_expansions = 50000

[executor]
plan_timeout_ms = 300000
action_timeout_ms = 30000

[orchestrator]
tick_interval_ms = 5000
max_goal_retries = 5
# max_pending_goals = 256
# plan_history = 100

[scoring]
capability_bonus = 10

[scenarios]
low_stock = true
order_backlog = true
order_backlog_threshold = 10
quality_issues = true
equipment_fault = true

[world]
# history_limit = 256

[world.initial]
equipmentOperational = true
ordersInQueue = []
lowStockItems = []
qualityIssues = []

[simulation]
action_latency_ms = 250

[logging]
level = "info"
# format = "pretty"  # pretty, json, compact

# Leave [[agents]] out to use the built-in warehouse roster.
# [[agents]]
# id = "picker-1"
# type = "picker"
# capabilities = ["picking", "packing", "shipping"]
# priority = 2
"#;

pub(super) fn cmd_init(local: bool) -> depot_core::Result<()> {
    let dir = if local {
        std::env::current_dir()?
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".depot")
    };

    std::fs::create_dir_all(&dir)?;
    let config_path = dir.join("depot.toml");

    if config_path.exists() {
        println!("⚠️  {} already exists", config_path.display());
        println!("   Run 'depot doctor' to check it.");
        return Ok(());
    }

    std::fs::write(&config_path, STARTER_CONFIG)?;
    println!("✅ Created {}", config_path.display());
    println!("   Edit it to describe your floor, then run: depot run");

    Ok(())
}
