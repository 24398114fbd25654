//! The built-in warehouse domain: the action catalog and the default roster.

use depot_config::AgentConfig;
use depot_core::{AgentKind, keys};
use depot_planner::{Action, ActionCatalog};

use crate::registry::Agent;

/// Every primitive warehouse operation.
pub fn actions() -> Vec<Action> {
    let none: Vec<String> = Vec::new();
    vec![
        // Inventory
        Action::new("CheckInventory", 1.0)
            .produces(keys::INVENTORY_CHECKED, true)
            .capability("inventory")
            .duration_ms(300),
        Action::new("OrderRestock", 2.0)
            .requires(keys::INVENTORY_CHECKED, true)
            .produces(keys::RESTOCK_ORDERED, true)
            .capability("inventory")
            .duration_ms(200),
        // Receiving
        Action::new("ReceiveStock", 3.0)
            .requires(keys::RESTOCK_ORDERED, true)
            .produces(keys::STOCK_RECEIVED, true)
            .produces(keys::RESTOCK_ORDERED, false)
            .capability("receiving")
            .duration_ms(800),
        Action::new("ShelveStock", 2.0)
            .requires(keys::STOCK_RECEIVED, true)
            .produces(keys::LOW_STOCK_ITEMS, none.clone())
            .produces(keys::STOCK_RECEIVED, false)
            .produces(keys::INVENTORY_CHECKED, false)
            .capability("receiving")
            .duration_ms(600),
        // Fulfilment
        Action::new("PickOrders", 2.0)
            .requires(keys::EQUIPMENT_OPERATIONAL, true)
            .produces(keys::ORDERS_PICKED, true)
            .capability("picking")
            .duration_ms(600),
        Action::new("PackOrders", 1.0)
            .requires(keys::ORDERS_PICKED, true)
            .produces(keys::ORDERS_PACKED, true)
            .capability("packing")
            .duration_ms(400),
        Action::new("ShipOrders", 1.0)
            .requires(keys::ORDERS_PACKED, true)
            .produces(keys::ORDERS_IN_QUEUE, none.clone())
            .produces(keys::ORDERS_PICKED, false)
            .produces(keys::ORDERS_PACKED, false)
            .capability("shipping")
            .duration_ms(500),
        // Quality
        Action::new("InspectBatch", 1.0)
            .produces(keys::BATCH_INSPECTED, true)
            .capability("inspection")
            .duration_ms(500),
        Action::new("QuarantineDefects", 2.0)
            .requires(keys::BATCH_INSPECTED, true)
            .produces(keys::QUALITY_ISSUES, none)
            .produces(keys::BATCH_INSPECTED, false)
            .capability("quality")
            .duration_ms(400),
        // Maintenance
        Action::new("DiagnoseEquipment", 1.0)
            .produces(keys::EQUIPMENT_DIAGNOSED, true)
            .capability("diagnostics")
            .duration_ms(400),
        Action::new("RepairEquipment", 3.0)
            .requires(keys::EQUIPMENT_DIAGNOSED, true)
            .produces(keys::EQUIPMENT_OPERATIONAL, true)
            .produces(keys::EQUIPMENT_DIAGNOSED, false)
            .capability("maintenance")
            .duration_ms(1_000),
    ]
}

pub fn catalog() -> depot_core::Result<ActionCatalog> {
    ActionCatalog::from_actions(actions())
}

/// The default floor crew.
pub fn roster() -> Vec<Agent> {
    vec![
        Agent::new("picker-1", AgentKind::Picker)
            .name("Picker 1")
            .capabilities(["picking", "packing", "shipping"])
            .priority(2),
        Agent::new("picker-2", AgentKind::Picker)
            .name("Picker 2")
            .capabilities(["picking", "packing", "shipping"])
            .priority(1),
        Agent::new("receiver-1", AgentKind::Receiver)
            .name("Receiver 1")
            .capabilities(["receiving", "inventory", "inspection", "forklift"])
            .priority(2),
        Agent::new("inspector-1", AgentKind::Inspector)
            .name("Inspector 1")
            .capabilities(["inspection", "quality"])
            .priority(2),
        Agent::new("maintenance-1", AgentKind::Maintenance)
            .name("Maintenance 1")
            .capabilities(["maintenance", "diagnostics"])
            .priority(3),
    ]
}

/// The configured roster, or [`roster`] when none is configured.
pub fn agents_from_config(configured: &[AgentConfig]) -> Vec<Agent> {
    if configured.is_empty() {
        roster()
    } else {
        configured.iter().map(Agent::from).collect()
    }
}
