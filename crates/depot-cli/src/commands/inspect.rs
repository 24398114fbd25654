use console::style;

use depot_config::DepotConfig;
use depot_core::{DepotError, WorldState};
use depot_planner::{Goal, PlanResponse, Planner, PlannerOptions};
use depot_runtime::{AgentRegistry, warehouse};

use super::{Category, parse_state_value};

pub(super) fn cmd_plan(
    config: DepotConfig,
    targets: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
    category: Category,
    agent_id: Option<String>,
    json: bool,
) -> depot_core::Result<()> {
    let mut world = config.world.initial.clone();
    for (key, raw) in &overrides {
        world.insert(key.clone(), parse_state_value(raw));
    }

    let mut goal = Goal::new("cli goal").context(category.context());
    for (key, raw) in &targets {
        goal = goal.target(key.clone(), parse_state_value(raw));
    }

    let registry = AgentRegistry::from_agents(warehouse::agents_from_config(&config.agents))?;
    let agent = match &agent_id {
        Some(id) => registry
            .get(id)
            .ok_or_else(|| DepotError::AgentNotFound(id.clone()))?,
        None => registry
            .find_best_agent(&goal, config.scoring.capability_bonus)
            .ok_or_else(|| DepotError::NoEligibleAgent {
                goal: goal.category().to_string(),
            })?,
    };

    let catalog = warehouse::catalog()?;
    let actions = catalog.for_capabilities(&agent.capabilities);
    let planner = Planner::new(PlannerOptions::from(&config.planner));
    let result = planner.plan(&goal, &world, &actions, &agent.id);

    if json {
        let failed = result.as_ref().err().cloned();
        println!("{}", serde_json::to_string_pretty(&PlanResponse::from(result))?);
        return failed.map_or(Ok(()), |f| Err(f.into()));
    }

    println!("🧭 Planning for {} ({})", style(&agent.id).bold(), agent.kind);
    print_world("Goal", goal.target_state.iter().map(|(k, r)| format!("{k} {r}")));
    let plan = match result {
        Ok(plan) => plan,
        Err(failure) => {
            println!("   {} {failure}", style("✗").red());
            return Err(failure.into());
        }
    };

    println!();
    for (i, action) in plan.actions.iter().enumerate() {
        println!(
            "   {:>2}. {:<20} {}",
            i + 1,
            style(&action.name).cyan(),
            style(format!("cost {}", action.cost)).dim()
        );
    }
    println!();
    println!(
        "   {} {} action(s), total cost {}",
        style("✓").green(),
        plan.actions.len(),
        plan.cost
    );
    Ok(())
}

pub(super) fn cmd_catalog(json: bool) -> depot_core::Result<()> {
    let catalog = warehouse::catalog()?;
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.all())?);
        return Ok(());
    }

    println!("{} ({} actions)", style("Action Catalog").bold(), catalog.len());
    println!("{}", "-".repeat(80));
    for action in catalog.all() {
        let caps: Vec<&str> = action.required_capabilities.iter().map(String::as_str).collect();
        println!(
            "{:<20} cost {:<4} [{}]",
            style(&action.name).cyan(),
            action.cost,
            caps.join(", ")
        );
        if !action.preconditions.is_empty() {
            let pre: Vec<String> = action
                .preconditions
                .iter()
                .map(|(k, r)| format!("{k} {r}"))
                .collect();
            println!("   {} {}", style("requires").dim(), pre.join(", "));
        }
        println!("   {} {}", style("produces").dim(), render(&action.effects));
    }
    Ok(())
}

pub(super) fn cmd_agents(config: DepotConfig, json: bool) -> depot_core::Result<()> {
    let registry = AgentRegistry::from_agents(warehouse::agents_from_config(&config.agents))?;
    if json {
        println!("{}", serde_json::to_string_pretty(registry.list())?);
        return Ok(());
    }

    println!("{} ({} agents)", style("Roster").bold(), registry.len());
    println!("{}", "-".repeat(80));
    for agent in registry.list() {
        let status = if agent.is_active {
            style("active").green()
        } else {
            style("inactive").red()
        };
        let caps: Vec<&str> = agent.capabilities.iter().map(String::as_str).collect();
        println!(
            "{:<16} {:<12} prio {:<3} {:<9} [{}]",
            style(&agent.id).bold(),
            agent.kind,
            agent.priority,
            status,
            caps.join(", ")
        );
    }
    Ok(())
}

fn render(state: &WorldState) -> String {
    state
        .iter()
        .map(|(k, v)| format!("{k} = {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_world(label: &str, entries: impl Iterator<Item = String>) {
    let entries: Vec<String> = entries.collect();
    println!("   {}: {}", style(label).dim(), entries.join(", "));
}
