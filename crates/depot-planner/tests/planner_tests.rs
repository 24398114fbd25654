#[cfg(test)]
mod tests {
    use depot_config::schema::PlannerConfig;
    use depot_core::{DepotError, PlanStatus, Predicate, StateValue, WorldState};
    use depot_planner::*;
    use std::time::Duration;

    fn pick_pack() -> Vec<Action> {
        vec![
            Action::new("Pick", 1.0)
                .requires("hasOrder", true)
                .produces("orderPicked", true),
            Action::new("Pack", 1.0)
                .requires("orderPicked", true)
                .produces("orderPacked", true),
        ]
    }

    fn packed_goal() -> Goal {
        Goal::new("pack order").target("orderPacked", true)
    }

    fn names(plan: &Plan) -> Vec<&str> {
        plan.action_names()
    }

    // ── Search tests ───────────────────────────────────────────

    #[test]
    fn test_two_step_chain() {
        let world = WorldState::new().with("hasOrder", true);
        let plan = Planner::default()
            .plan(&packed_goal(), &world, &pick_pack(), "picker-1")
            .unwrap();

        assert_eq!(names(&plan), vec!["Pick", "Pack"]);
        assert_eq!(plan.cost, 2.0);
        assert_eq!(plan.agent_id, "picker-1");
        assert_eq!(plan.status, PlanStatus::Pending);
        assert_eq!(plan.cursor, 0);
    }

    #[test]
    fn test_unreachable_precondition() {
        let world = WorldState::new().with("hasOrder", false);
        let err = Planner::default()
            .plan(&packed_goal(), &world, &pick_pack(), "picker-1")
            .unwrap_err();

        assert_eq!(
            err,
            PlanningFailure::Unreachable {
                condition: "hasOrder == true".into()
            }
        );
        assert!(err.to_string().starts_with("unreachable goal condition"));
    }

    #[test]
    fn test_unreachable_target_detected_upfront() {
        let goal = Goal::new("impossible").target("teleported", true);
        let err = Planner::default()
            .plan(&goal, &WorldState::new(), &pick_pack(), "a")
            .unwrap_err();
        assert!(matches!(err, PlanningFailure::Unreachable { ref condition } if condition == "teleported == true"));
    }

    #[test]
    fn test_no_actions_available() {
        let err = Planner::default()
            .plan(&packed_goal(), &WorldState::new(), &[], "a")
            .unwrap_err();
        assert_eq!(err, PlanningFailure::NoActions);
        assert_eq!(err.to_string(), "no actions available");
    }

    #[test]
    fn test_already_satisfied_goal() {
        let world = WorldState::new().with("orderPacked", true);
        let err = Planner::default()
            .plan(&packed_goal(), &world, &pick_pack(), "a")
            .unwrap_err();
        assert_eq!(err, PlanningFailure::AlreadySatisfied);
    }

    #[test]
    fn test_empty_goal_rejected() {
        let err = Planner::default()
            .plan(&Goal::new("nothing"), &WorldState::new(), &pick_pack(), "a")
            .unwrap_err();
        assert_eq!(err, PlanningFailure::EmptyGoal);
    }

    #[test]
    fn test_cheapest_plan_wins_over_shorter() {
        let actions = vec![
            Action::new("Expedite", 5.0).produces("done", true),
            Action::new("Prepare", 1.0).produces("ready", true),
            Action::new("Finish", 1.0)
                .requires("ready", true)
                .produces("done", true),
        ];
        let goal = Goal::new("done").target("done", true);
        let plan = Planner::default()
            .plan(&goal, &WorldState::new(), &actions, "a")
            .unwrap();

        assert_eq!(names(&plan), vec!["Prepare", "Finish"]);
        assert_eq!(plan.cost, 2.0);
    }

    #[test]
    fn test_equal_cost_prefers_registration_order() {
        let actions = vec![
            Action::new("Left", 1.0).produces("x", true),
            Action::new("Right", 1.0).produces("x", true),
        ];
        let goal = Goal::new("x").target("x", true);
        let plan = Planner::default()
            .plan(&goal, &WorldState::new(), &actions, "a")
            .unwrap();
        assert_eq!(names(&plan), vec!["Left"]);
    }

    #[test]
    fn test_equal_cost_chains_compare_full_sequence() {
        // Both routes cost 2 and take 2 steps; [MakeB, G2] = [2, 1] sorts
        // before [MakeA, G1] = [3, 0] even though G1 is registered first.
        let actions = vec![
            Action::new("G1", 1.0).requires("a", true).produces("g", true),
            Action::new("G2", 1.0).requires("b", true).produces("g", true),
            Action::new("MakeB", 1.0).produces("b", true),
            Action::new("MakeA", 1.0).produces("a", true),
        ];
        let goal = Goal::new("g").target("g", true);
        let planner = Planner::default();

        let indices = planner.search(&goal, &WorldState::new(), &actions).unwrap();
        assert_eq!(indices, vec![2, 1]);

        let plan = planner.plan(&goal, &WorldState::new(), &actions, "a").unwrap();
        assert_eq!(names(&plan), vec!["MakeB", "G2"]);
    }

    #[test]
    fn test_equal_cost_prefers_fewer_actions() {
        let actions = vec![
            Action::new("Half", 0.5).produces("half", true),
            Action::new("OtherHalf", 0.5)
                .requires("half", true)
                .produces("x", true),
            Action::new("Whole", 1.0).produces("x", true),
        ];
        let goal = Goal::new("x").target("x", true);
        let plan = Planner::default()
            .plan(&goal, &WorldState::new(), &actions, "a")
            .unwrap();
        assert_eq!(names(&plan), vec!["Whole"]);
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let actions = vec![
            Action::new("A", 1.0).produces("x", true),
            Action::new("B", 1.0).produces("y", true),
            Action::new("C", 1.0).produces("x", true).produces("y", true),
            Action::new("D", 2.0).produces("x", true),
        ];
        let goal = Goal::new("xy").target("x", true).target("y", true);
        let world = WorldState::new();
        let planner = Planner::default();

        let first = planner.search(&goal, &world, &actions).unwrap();
        for _ in 0..20 {
            assert_eq!(planner.search(&goal, &world, &actions).unwrap(), first);
        }
        // One action covering both keys is cheaper than two.
        assert_eq!(first, vec![2]);
    }

    #[test]
    fn test_orders_actions_to_avoid_clobbering() {
        // SetA resets `b`, so it must run before SetB.
        let actions = vec![
            Action::new("SetA", 1.0).produces("a", true).produces("b", false),
            Action::new("SetB", 1.0).produces("b", true),
        ];
        let goal = Goal::new("both").target("a", true).target("b", true);
        let plan = Planner::default()
            .plan(&goal, &WorldState::new(), &actions, "a")
            .unwrap();
        assert_eq!(names(&plan), vec!["SetA", "SetB"]);
    }

    #[test]
    fn test_conflicting_precondition_prunes_branch() {
        // Toggle needs `lit == false` but the goal also needs `lit == true`.
        let actions = vec![
            Action::new("Toggle", 1.0)
                .requires("lit", false)
                .produces("flag", true),
            Action::new("Raise", 3.0).produces("flag", true),
        ];
        let goal = Goal::new("flag").target("flag", true).target("lit", true);
        let world = WorldState::new().with("lit", true);
        let plan = Planner::default().plan(&goal, &world, &actions, "a").unwrap();
        assert_eq!(names(&plan), vec!["Raise"]);
    }

    #[test]
    fn test_plan_is_sound_when_replayed() {
        let world = WorldState::new().with("hasOrder", true);
        let goal = packed_goal();
        let plan = Planner::default()
            .plan(&goal, &world, &pick_pack(), "a")
            .unwrap();

        let mut state = world.clone();
        for action in &plan.actions {
            assert!(action.preconditions_hold(&state), "{} not applicable", action.name);
            state.merge(&action.effects);
        }
        assert!(goal.is_satisfied_by(&state));
    }

    #[test]
    fn test_predicate_target() {
        let actions = vec![Action::new("Shelve", 1.0).produces("lowStockItems", Vec::<String>::new())];
        let goal = Goal::new("restock").target("lowStockItems", Predicate::Empty);
        let world = WorldState::new().with("lowStockItems", vec!["SKU-1"]);
        let plan = Planner::default().plan(&goal, &world, &actions, "a").unwrap();
        assert_eq!(names(&plan), vec!["Shelve"]);
    }

    // ── Bound tests ────────────────────────────────────────────

    fn chain(len: usize) -> Vec<Action> {
        (0..len)
            .map(|i| {
                let action = Action::new(format!("step{i}"), 1.0).produces(format!("s{}", i + 1), true);
                if i == 0 {
                    action
                } else {
                    action.requires(format!("s{i}"), true)
                }
            })
            .collect()
    }

    #[test]
    fn test_depth_bound_exhausts() {
        let planner = Planner::new(PlannerOptions {
            max_depth: 2,
            ..PlannerOptions::default()
        });
        let goal = Goal::new("far").target("s4", true);
        let err = planner.plan(&goal, &WorldState::new(), &chain(4), "a").unwrap_err();
        assert!(matches!(err, PlanningFailure::Exhausted { .. }));
        assert!(err.to_string().contains("max depth 2"));

        let deep = Planner::new(PlannerOptions {
            max_depth: 4,
            ..PlannerOptions::default()
        });
        let plan = deep.plan(&goal, &WorldState::new(), &chain(4), "a").unwrap();
        assert_eq!(plan.actions.len(), 4);
    }

    #[test]
    fn test_expansion_bound_exhausts() {
        let planner = Planner::new(PlannerOptions {
            max_expansions: 1,
            ..PlannerOptions::default()
        });
        let goal = Goal::new("far").target("s3", true);
        let err = planner.plan(&goal, &WorldState::new(), &chain(3), "a").unwrap_err();
        assert!(matches!(err, PlanningFailure::Exhausted { ref reason } if reason.contains("expansion")));
    }

    #[test]
    fn test_timeout_exhausts() {
        let planner = Planner::new(PlannerOptions {
            timeout: Duration::ZERO,
            ..PlannerOptions::default()
        });
        let goal = Goal::new("far").target("s3", true);
        let err = planner.plan(&goal, &WorldState::new(), &chain(3), "a").unwrap_err();
        assert!(matches!(err, PlanningFailure::Exhausted { ref reason } if reason.contains("timed out")));
        assert!(err.to_string().starts_with("search exhausted"));
    }

    #[test]
    fn test_options_from_config() {
        let config = PlannerConfig {
            max_depth: 7,
            timeout_ms: 250,
            max_expansions: 99,
        };
        let options = PlannerOptions::from(&config);
        assert_eq!(options.max_depth, 7);
        assert_eq!(options.timeout, Duration::from_millis(250));
        assert_eq!(options.max_expansions, 99);
        assert_eq!(PlannerOptions::default().max_depth, 10);
    }

    #[test]
    fn test_failure_converts_to_error() {
        let err: DepotError = PlanningFailure::NoActions.into();
        assert!(matches!(err, DepotError::Planning(ref m) if m == "no actions available"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_plan_response_shape() {
        let world = WorldState::new().with("hasOrder", true);
        let ok = PlanResponse::from(Planner::default().plan(&packed_goal(), &world, &pick_pack(), "a"));
        assert!(ok.success);
        assert_eq!(ok.plan.as_ref().map(|p| p.actions.len()), Some(2));

        let failed = PlanResponse::from(Planner::default().plan(&packed_goal(), &world, &[], "a"));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "no actions available");
        assert!(json.get("plan").is_none());
    }

    // ── Catalog tests ──────────────────────────────────────────

    #[test]
    fn test_catalog_filters_by_capability() {
        let catalog = ActionCatalog::from_actions(vec![
            Action::new("Pick", 1.0).produces("picked", true).capability("picking"),
            Action::new("Wave", 1.0).produces("waved", true),
            Action::new("Forklift", 2.0)
                .produces("lifted", true)
                .capability("receiving")
                .capability("forklift"),
            Action::new("Pack", 1.0).produces("packed", true).capability("packing"),
        ])
        .unwrap();

        let picker = ["picking", "packing"].iter().map(|s| s.to_string()).collect();
        let names: Vec<String> = catalog.for_capabilities(&picker).into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Pick", "Wave", "Pack"]);

        // Needs both tags.
        let receiver = ["receiving"].iter().map(|s| s.to_string()).collect();
        let names: Vec<String> = catalog.for_capabilities(&receiver).into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Wave"]);

        assert_eq!(catalog.len(), 4);
        assert!(catalog.get("Forklift").is_some());
        assert_eq!(
            catalog.capabilities().cloned().collect::<Vec<_>>(),
            vec!["forklift", "packing", "picking", "receiving"]
        );
    }

    #[test]
    fn test_catalog_rejects_invalid_actions() {
        let mut catalog = ActionCatalog::new();
        catalog.register(Action::new("Pick", 1.0).produces("picked", true)).unwrap();

        let dup = catalog.register(Action::new("Pick", 2.0).produces("picked", true));
        assert!(matches!(dup, Err(DepotError::DuplicateAction(ref n)) if n == "Pick"));

        let negative = catalog.register(Action::new("Refund", -1.0).produces("x", true));
        assert!(matches!(negative, Err(DepotError::ConfigValidation { .. })));

        let inert = catalog.register(Action::new("Idle", 1.0));
        assert!(matches!(inert, Err(DepotError::ConfigValidation { .. })));

        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_action_json_uses_camel_case() {
        let action: Action = serde_json::from_str(
            r#"{
                "name": "Ship",
                "preconditions": {"ordersPacked": true},
                "effects": {"ordersInQueue": []},
                "requiredCapabilities": ["shipping"],
                "durationMs": 500
            }"#,
        )
        .unwrap();
        assert_eq!(action.cost, 1.0);
        assert_eq!(action.duration_ms, Some(500));
        assert!(action.required_capabilities.contains("shipping"));
        assert_eq!(
            action.effects.get("ordersInQueue"),
            Some(&StateValue::List(vec![]))
        );
    }

    // ── Plan tests ─────────────────────────────────────────────

    #[test]
    fn test_plan_rejects_empty_sequence() {
        assert!(Plan::new(uuid::Uuid::new_v4(), "a", vec![]).is_err());
    }

    #[test]
    fn test_plan_state_machine() {
        let mut plan = Plan::new(uuid::Uuid::new_v4(), "a", pick_pack()).unwrap();
        assert_eq!(plan.next_action().map(|a| a.name.as_str()), Some("Pick"));

        // Not started yet.
        plan.advance();
        assert_eq!(plan.cursor, 0);

        assert!(plan.start());
        assert!(!plan.start());
        assert_eq!(plan.status, PlanStatus::Executing);

        plan.advance();
        assert_eq!(plan.remaining(), 1);
        assert_eq!(plan.progress(), 0.5);
        plan.advance();
        assert!(plan.next_action().is_none());

        assert!(plan.complete());
        assert!(plan.is_terminal());
        assert!(!plan.fail("too late"));
        assert_eq!(plan.status, PlanStatus::Completed);
        assert!(plan.failure_reason.is_none());
        assert!(plan.duration_ms().is_some());
    }

    #[test]
    fn test_plan_cancel_records_reason() {
        let mut plan = Plan::new(uuid::Uuid::new_v4(), "a", pick_pack()).unwrap();
        plan.start();
        assert!(plan.cancel("system stopped"));
        assert_eq!(plan.status, PlanStatus::Cancelled);
        assert_eq!(plan.failure_reason.as_deref(), Some("system stopped"));
    }

    // ── Goal tests ─────────────────────────────────────────────

    #[test]
    fn test_goal_context_json() {
        let ctx: GoalContext =
            serde_json::from_str(r#"{"type": "order_fulfillment", "orderIds": ["o-1"]}"#).unwrap();
        assert_eq!(
            ctx,
            GoalContext::OrderFulfillment {
                order_ids: vec!["o-1".into()]
            }
        );
        assert_eq!(ctx.category(), GoalCategory::OrderFulfillment);

        let general: GoalContext = serde_json::from_str(r#"{"type": "general"}"#).unwrap();
        assert_eq!(general, GoalContext::General);

        let json = serde_json::to_value(GoalContext::EquipmentMaintenance {
            equipment_id: Some("conveyor-2".into()),
        })
        .unwrap();
        assert_eq!(json["type"], "equipment_maintenance");
        assert_eq!(json["equipmentId"], "conveyor-2");
    }

    #[test]
    fn test_goal_json_with_predicates() {
        let goal: Goal = serde_json::from_str(
            r#"{
                "name": "restock",
                "targetState": {
                    "lowStockItems": {"op": "empty"},
                    "equipmentOperational": true
                },
                "priority": 3,
                "context": {"type": "inventory_optimization", "skus": ["SKU-1"]}
            }"#,
        )
        .unwrap();

        assert_eq!(goal.priority, 3);
        assert_eq!(goal.category(), GoalCategory::InventoryOptimization);
        assert!(goal.scenario.is_none());

        let ok = WorldState::new()
            .with("lowStockItems", Vec::<String>::new())
            .with("equipmentOperational", true);
        assert!(goal.is_satisfied_by(&ok));
        assert!(!goal.is_satisfied_by(&ok.clone().with("lowStockItems", vec!["SKU-1"])));
    }

    #[test]
    fn test_category_capability_tables() {
        assert_eq!(GoalCategory::OrderFulfillment.required_capabilities(), &["picking"]);
        assert_eq!(
            GoalCategory::InventoryOptimization.preferred_capabilities(),
            &["inventory", "receiving", "forklift"]
        );
        assert!(GoalCategory::General.required_capabilities().is_empty());
        assert_eq!(GoalCategory::QualityAssurance.to_string(), "quality_assurance");
    }
}
