#[cfg(test)]
mod tests {
    use clap::Parser;
    use depot_cli::*;
    use depot_config::ConfigLoader;
    use depot_core::StateValue;

    // ── Argument parsing ───────────────────────────────────────

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("lowStockItems=[]").unwrap(),
            ("lowStockItems".to_string(), "[]".to_string())
        );
        assert_eq!(
            parse_key_val("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=true").is_err());
    }

    #[test]
    fn test_parse_state_value() {
        assert_eq!(parse_state_value("true"), StateValue::Bool(true));
        assert_eq!(parse_state_value("false"), StateValue::Bool(false));
        assert_eq!(parse_state_value("3"), StateValue::Number(3.0));
        assert_eq!(parse_state_value("[]"), StateValue::List(vec![]));
        assert_eq!(
            parse_state_value("[SKU-1, \"SKU-2\"]"),
            StateValue::List(vec!["SKU-1".into(), "SKU-2".into()])
        );
        assert_eq!(parse_state_value("dock-4"), StateValue::Text("dock-4".into()));
    }

    #[test]
    fn test_cli_accepts_plan_command() {
        let cli = Cli::try_parse_from([
            "depot",
            "plan",
            "--goal",
            "lowStockItems=[]",
            "--world",
            "lowStockItems=[SKU-1]",
            "--category",
            "inventory-optimization",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_plan_requires_goal() {
        assert!(Cli::try_parse_from(["depot", "plan"]).is_err());
    }

    #[test]
    fn test_cli_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["depot", "-v", "-q", "catalog"]).is_err());
        assert!(Cli::try_parse_from(["depot", "--config", "x.toml", "run", "--duration", "5"]).is_ok());
    }

    // ── Starter config ─────────────────────────────────────────

    #[test]
    fn test_starter_config_parses_and_validates() {
        let config = ConfigLoader::parse(STARTER_CONFIG).unwrap();
        assert_eq!(config.orchestrator.tick_interval_ms, 5_000);
        assert_eq!(config.scoring.capability_bonus, 10);
        assert!(config.agents.is_empty());
        assert_eq!(
            config.world.initial.get("equipmentOperational"),
            Some(&StateValue::Bool(true))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_starter_config_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depot.toml");
        std::fs::write(&path, STARTER_CONFIG).unwrap();

        let loader = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(loader.path(), path.as_path());
        assert_eq!(loader.get().planner.max_depth, 10);
    }
}
