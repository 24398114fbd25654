use depot_config::schema::ScenariosConfig;
use depot_core::{StateValue, WorldState, keys};
use depot_planner::{Goal, GoalContext};
use tracing::debug;

/// Recognizes one class of trouble in the world and proposes a goal for it.
///
/// The orchestrator tags the goal with [`ScenarioDetector::name`] and only
/// keeps one goal per scenario class queued or executing at a time.
pub trait ScenarioDetector: Send + Sync {
    fn name(&self) -> &str;
    fn detect(&self, world: &WorldState, config: &ScenariosConfig) -> Option<Goal>;
}

/// Runs every registered detector over a snapshot.
pub struct ScenarioEngine {
    detectors: Vec<Box<dyn ScenarioDetector>>,
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioEngine {
    /// An engine with the built-in warehouse detectors.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        engine.add_detector(Box::new(EquipmentFaultDetector));
        engine.add_detector(Box::new(QualityIssueDetector));
        engine.add_detector(Box::new(OrderBacklogDetector));
        engine.add_detector(Box::new(LowStockDetector));
        engine
    }

    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn add_detector(&mut self, detector: Box<dyn ScenarioDetector>) {
        self.detectors.push(detector);
    }

    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// One tagged goal per scenario currently present in `world`.
    pub fn detect(&self, world: &WorldState, config: &ScenariosConfig) -> Vec<Goal> {
        self.detectors
            .iter()
            .filter_map(|detector| {
                let goal = detector.detect(world, config)?;
                debug!(scenario = detector.name(), goal = %goal.name, "scenario detected");
                Some(goal.scenario(detector.name()))
            })
            .collect()
    }
}

fn list<'a>(world: &'a WorldState, key: &str) -> &'a [String] {
    world.get(key).and_then(StateValue::as_list).unwrap_or(&[])
}

// ── Built-in detectors ─────────────────────────────────────────

/// `lowStockItems` is non-empty.
pub struct LowStockDetector;

impl ScenarioDetector for LowStockDetector {
    fn name(&self) -> &str {
        "low_stock"
    }

    fn detect(&self, world: &WorldState, config: &ScenariosConfig) -> Option<Goal> {
        let items = list(world, keys::LOW_STOCK_ITEMS);
        if !config.low_stock || items.is_empty() {
            return None;
        }
        Some(
            Goal::new("restock")
                .description(format!("Restock {} low-stock item(s)", items.len()))
                .target(keys::LOW_STOCK_ITEMS, Vec::<String>::new())
                .priority(5)
                .context(GoalContext::InventoryOptimization {
                    skus: items.to_vec(),
                }),
        )
    }
}

/// `ordersInQueue` is longer than the configured threshold.
pub struct OrderBacklogDetector;

impl ScenarioDetector for OrderBacklogDetector {
    fn name(&self) -> &str {
        "order_backlog"
    }

    fn detect(&self, world: &WorldState, config: &ScenariosConfig) -> Option<Goal> {
        let orders = list(world, keys::ORDERS_IN_QUEUE);
        if !config.order_backlog || orders.len() <= config.order_backlog_threshold {
            return None;
        }
        Some(
            Goal::new("clear order backlog")
                .description(format!("Fulfil {} queued order(s)", orders.len()))
                .target(keys::ORDERS_IN_QUEUE, Vec::<String>::new())
                .priority(6)
                .context(GoalContext::OrderFulfillment {
                    order_ids: orders.to_vec(),
                }),
        )
    }
}

/// `qualityIssues` is non-empty.
pub struct QualityIssueDetector;

impl ScenarioDetector for QualityIssueDetector {
    fn name(&self) -> &str {
        "quality_issues"
    }

    fn detect(&self, world: &WorldState, config: &ScenariosConfig) -> Option<Goal> {
        let issues = list(world, keys::QUALITY_ISSUES);
        if !config.quality_issues || issues.is_empty() {
            return None;
        }
        Some(
            Goal::new("resolve quality issues")
                .target(keys::QUALITY_ISSUES, Vec::<String>::new())
                .priority(8)
                .context(GoalContext::QualityAssurance {
                    issues: issues.to_vec(),
                }),
        )
    }
}

/// `equipmentOperational` is false.
pub struct EquipmentFaultDetector;

impl ScenarioDetector for EquipmentFaultDetector {
    fn name(&self) -> &str {
        "equipment_fault"
    }

    fn detect(&self, world: &WorldState, config: &ScenariosConfig) -> Option<Goal> {
        let faulted = world
            .get(keys::EQUIPMENT_OPERATIONAL)
            .and_then(StateValue::as_bool)
            == Some(false);
        if !config.equipment_fault || !faulted {
            return None;
        }
        Some(
            Goal::new("repair equipment")
                .target(keys::EQUIPMENT_OPERATIONAL, true)
                .priority(10)
                .context(GoalContext::EquipmentMaintenance { equipment_id: None }),
        )
    }
}
