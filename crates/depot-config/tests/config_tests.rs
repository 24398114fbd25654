#[cfg(test)]
mod tests {
    use depot_config::ConfigLoader;
    use depot_config::schema::*;
    use depot_core::{AgentKind, StateValue};
    use std::io::Write;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_planner_config_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.timeout_ms, 1_000);
        assert_eq!(config.max_expansions, 50_000);
    }

    #[test]
    fn test_orchestrator_config_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.tick_interval_ms, 5_000);
        assert_eq!(config.max_goal_retries, 5);
        assert_eq!(config.plan_history, 100);
    }

    #[test]
    fn test_scenario_and_scoring_defaults() {
        let scenarios = ScenariosConfig::default();
        assert!(scenarios.low_stock);
        assert!(scenarios.order_backlog);
        assert_eq!(scenarios.order_backlog_threshold, 10);
        assert_eq!(ScoringConfig::default().capability_bonus, 10);
    }

    #[test]
    fn test_world_defaults_seed_warehouse_keys() {
        let world = WorldConfig::default();
        assert_eq!(
            world.initial.get("equipmentOperational"),
            Some(&StateValue::Bool(true))
        );
        assert_eq!(
            world.initial.get("lowStockItems"),
            Some(&StateValue::List(vec![]))
        );
    }

    #[test]
    fn test_default_config_validates() {
        let warnings = DepotConfig::default().validate().unwrap();
        assert!(warnings.iter().all(|w| w.severity != WarningSeverity::Error));
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = DepotConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: DepotConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.planner.max_depth, config.planner.max_depth);
        assert_eq!(
            restored.orchestrator.tick_interval_ms,
            config.orchestrator.tick_interval_ms
        );
        assert_eq!(restored.world.initial, config.world.initial);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[planner]
max_depth = 6

[world.initial]
lowStockItems = ["SKU-1"]
"#;
        let config = ConfigLoader::parse(toml_str).unwrap();
        assert_eq!(config.planner.max_depth, 6);
        assert_eq!(config.planner.timeout_ms, 1_000);
        assert_eq!(
            config.world.initial.get("lowStockItems"),
            Some(&StateValue::List(vec!["SKU-1".into()]))
        );
        assert_eq!(config.world.history_limit, 256);
        assert!(config.agents.is_empty());
    }

    #[test]
    fn test_agent_roster_deserialize() {
        let toml_str = r#"
[[agents]]
id = "picker-1"
type = "picker"
capabilities = ["picking", "packing"]
priority = 3

[[agents]]
id = "fixer"
type = "maintenance"
capabilities = ["maintenance"]
active = false
"#;
        let config = ConfigLoader::parse(toml_str).unwrap();
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[0].kind, AgentKind::Picker);
        assert_eq!(config.agents[0].priority, 3);
        assert!(config.agents[0].active);
        assert!(!config.agents[1].active);
        assert_eq!(config.agents[1].priority, 0);
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_validation_rejects_zero_depth() {
        let mut config = DepotConfig::default();
        config.planner.max_depth = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("planner.max_depth"));
    }

    #[test]
    fn test_validation_rejects_duplicate_agents() {
        let toml_str = r#"
[[agents]]
id = "a"
type = "picker"
capabilities = ["picking"]

[[agents]]
id = "a"
type = "receiver"
capabilities = ["receiving"]
"#;
        let config = ConfigLoader::parse(toml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate agent id 'a'"));
    }

    #[test]
    fn test_validation_warns_on_unknown_log_format() {
        let mut config = DepotConfig::default();
        config.logging.format = "xml".into();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "logging.format"));
    }

    // ── ConfigLoader tests ─────────────────────────────────────

    #[test]
    fn test_config_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("depot.toml");
        let mut f = std::fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            r#"
[orchestrator]
tick_interval_ms = 250
max_goal_retries = 2

[executor]
action_timeout_ms = 1000
"#
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let config = loader.get();
        assert_eq!(config.orchestrator.tick_interval_ms, 250);
        assert_eq!(config.orchestrator.max_goal_retries, 2);
        assert_eq!(config.executor.action_timeout_ms, 1000);
        assert_eq!(loader.path(), config_path.as_path());
    }

    #[test]
    fn test_config_loader_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("depot.toml");
        std::fs::write(&config_path, "[planner]\nmax_depth = 0\n").unwrap();
        assert!(ConfigLoader::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_config_loader_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("depot.toml");
        std::fs::write(&config_path, "[scoring]\ncapability_bonus = 5\n").unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let shared = loader.shared();
        assert_eq!(shared.read().scoring.capability_bonus, 5);

        std::fs::write(&config_path, "[scoring]\ncapability_bonus = 20\n").unwrap();
        loader.reload().unwrap();
        assert_eq!(loader.get().scoring.capability_bonus, 20);
        // Shared handles observe the reload
        assert_eq!(shared.read().scoring.capability_bonus, 20);
    }

    // ── JSON roundtrip ─────────────────────────────────────────

    #[test]
    fn test_config_json_roundtrip() {
        let config = DepotConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: DepotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.planner.max_depth, config.planner.max_depth);
    }
}
