use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use depot_core::DepotError;

use crate::schema::DepotConfig;

/// Loads and optionally hot-reloads the Depot configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<DepotConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > DEPOT_CONFIG env > ~/.depot/depot.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("DEPOT_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".depot")
            .join("depot.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> depot_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            DepotConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        // Log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(DepotError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Parse a config from a TOML string (no env overrides, no validation).
    pub fn parse(raw: &str) -> depot_core::Result<DepotConfig> {
        toml::from_str::<DepotConfig>(raw)
            .map_err(|e| DepotError::Config(format!("failed to parse config: {e}")))
    }

    fn read(path: &Path) -> depot_core::Result<DepotConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<DepotConfig>(&raw).map_err(|e| {
            DepotError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> DepotConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<DepotConfig>> {
        Arc::clone(&self.config)
    }

    /// Path being watched.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (DEPOT_TICK_INTERVAL_MS, DEPOT_MAX_DEPTH, etc.)
    fn apply_env_overrides(mut config: DepotConfig) -> DepotConfig {
        if let Ok(v) = std::env::var("DEPOT_TICK_INTERVAL_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                config.orchestrator.tick_interval_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("DEPOT_MAX_DEPTH") {
            if let Ok(depth) = v.parse::<usize>() {
                config.planner.max_depth = depth;
            }
        }
        if let Ok(v) = std::env::var("DEPOT_PLANNER_TIMEOUT_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                config.planner.timeout_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("DEPOT_LOG_LEVEL") {
            config.logging.level = v;
        }
        config
    }

    /// Reload the config from disk.
    pub fn reload(&self) -> depot_core::Result<()> {
        if !self.config_path.exists() {
            return Err(DepotError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::apply_env_overrides(Self::read(&self.config_path)?);
        new_config.validate().map_err(DepotError::Config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }

    /// Start a background file watcher that reloads the shared config when the
    /// file changes. The returned watcher must be kept alive.
    pub fn watch(&self) -> depot_core::Result<notify::RecommendedWatcher> {
        let config = Arc::clone(&self.config);
        let path_for_event = self.config_path.clone();

        info!(config_path = ?self.config_path, "starting config file watcher");

        let mut watcher = notify::recommended_watcher(
            move |res: Result<NotifyEvent, notify::Error>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        return;
                    }
                    let is_our_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == path_for_event.file_name());
                    if !is_our_file {
                        return;
                    }

                    info!("config file changed, reloading");
                    match ConfigLoader::read(&path_for_event) {
                        Ok(new_config) => {
                            let new_config = ConfigLoader::apply_env_overrides(new_config);
                            if let Err(e) = new_config.validate() {
                                warn!(error = %e, "config file has errors, keeping current config");
                                return;
                            }
                            *config.write() = new_config;
                            info!("configuration hot-reloaded successfully");
                        }
                        Err(e) => {
                            warn!(error = %e, "config file has errors, keeping current config");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "file watcher error");
                }
            },
        )
        .map_err(|e| DepotError::Config(format!("failed to create file watcher: {}", e)))?;

        // Watch the parent directory (some editors create temp files + rename)
        let watch_path = self.config_path.parent().unwrap_or(Path::new("."));
        watcher
            .watch(watch_path, RecursiveMode::NonRecursive)
            .map_err(|e| DepotError::Config(format!("failed to watch config directory: {}", e)))?;

        Ok(watcher)
    }
}
