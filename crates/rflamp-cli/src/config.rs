//! TOML configuration file.
//!
//! ```toml
//! [home_assistant]
//! url = "http://homeassistant.local:8123"
//! token_env = "RFLAMP_HA_TOKEN"
//!
//! [[lamps]]
//! lamp_name = "Desk"
//! remote_entity_id = "remote.living_room"
//! device_name = "desk_lamp"
//! brightness_levels = 10
//! cct_levels = 4
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use rflamp_commands::HomeAssistantConfig;
use rflamp_core::LampConfig;
use rflamp_core::config::{env_vars, paths};

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Home Assistant connection, commands are only logged without it
    #[serde(default)]
    pub home_assistant: Option<HomeAssistantConfig>,
    /// Configured lamps
    #[serde(default)]
    pub lamps: Vec<LampConfig>,
}

impl CliConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!(
            category = "config",
            path = %path.display(),
            lamps = config.lamps.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

/// Resolve a path from the command line, then the environment, then the default.
pub fn resolve_path(arg: Option<PathBuf>, env_var: &str, default: &str) -> PathBuf {
    arg.or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

pub fn config_path(arg: Option<PathBuf>) -> PathBuf {
    resolve_path(arg, env_vars::CONFIG_PATH, paths::CONFIG)
}

pub fn state_db_path(arg: Option<PathBuf>) -> PathBuf {
    resolve_path(arg, env_vars::STATE_DB, paths::STATE_DB)
}
