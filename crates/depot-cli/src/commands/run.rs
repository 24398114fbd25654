use console::style;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use depot_config::ConfigLoader;
use depot_core::{Event, PlanStatus, WorldState};
use depot_runtime::{Orchestrator, SystemStatus};

use super::parse_state_value;

pub(super) async fn cmd_run(
    config_loader: ConfigLoader,
    duration: Option<u64>,
    inject: Vec<(String, String)>,
) -> depot_core::Result<()> {
    let config = config_loader.get();
    println!("📦 Depot v{}", env!("CARGO_PKG_VERSION"));
    println!("   Tick: every {}ms", config.orchestrator.tick_interval_ms);
    println!(
        "   Planner: depth {}, timeout {}ms",
        config.planner.max_depth, config.planner.timeout_ms
    );

    // Kept alive for the whole run
    let _watcher = match config_loader.watch() {
        Ok(w) => {
            println!("   Config hot-reload: enabled");
            Some(w)
        }
        Err(e) => {
            warn!(error = %e, "config hot-reload disabled");
            None
        }
    };
    println!();

    let orchestrator = Orchestrator::builder()
        .shared_config(config_loader.shared())
        .build()?;
    let mut events = orchestrator.subscribe();

    if !inject.is_empty() {
        let effects: WorldState = inject
            .iter()
            .map(|(k, v)| (k.clone(), parse_state_value(v)))
            .collect();
        orchestrator.apply_world_effects(&effects, "cli");
    }
    orchestrator.start();

    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                println!("   Shutting down...");
                break;
            }
            _ = &mut deadline => break,
            received = events.recv() => match received {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    orchestrator.stop().await;
    print_status(&orchestrator.status());
    Ok(())
}

fn print_event(event: &Event) {
    let ts = chrono::Local::now().format("%H:%M:%S");
    let line = match event {
        Event::ScenarioDetected { scenario, .. } => {
            format!("{} {scenario}", style("scenario").yellow())
        }
        Event::GoalAssigned { agent_id, plan_id, .. } => {
            format!("{} plan {plan_id} → {agent_id}", style("assigned").cyan())
        }
        Event::ActionCompleted { agent_id, action, step, .. } => {
            format!("{} {agent_id} step {step}: {action}", style("action").dim())
        }
        Event::PlanFinished { agent_id, status, reason, .. } => {
            let label = match status {
                PlanStatus::Completed => style(status.to_string()).green(),
                _ => style(status.to_string()).red(),
            };
            match reason {
                Some(reason) => format!("{label} {agent_id}: {reason}"),
                None => format!("{label} {agent_id}"),
            }
        }
        Event::GoalSatisfied { goal_id } => format!("{} goal {goal_id}", style("satisfied").green()),
        Event::PlanningFailed { agent_id, reason, .. } => {
            format!("{} {agent_id}: {reason}", style("planning failed").red())
        }
        Event::GoalAbandoned { goal_id, attempts, .. } => {
            format!("{} goal {goal_id} after {attempts} attempts", style("abandoned").red())
        }
        _ => return,
    };
    println!("{} {line}", style(ts).dim());
}

fn print_status(status: &SystemStatus) {
    println!();
    println!("{}", style("Summary").bold());
    println!("   State: {}", status.state);
    println!("   Ticks: {}", status.ticks);
    println!(
        "   Plans: {} completed, {} failed, {} cancelled",
        status.completed_plans, status.failed_plans, status.cancelled_plans
    );
    println!("   Pending goals: {}", status.pending_goals);
    println!("   World version: {}", status.world_version);
}
