//! Lamp configuration and shared constants.
//!
//! Every crate in the workspace takes its defaults from here so the pacing
//! interval, Kelvin range and level limits are defined exactly once.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::state::DeviceCapabilities;

/// Command pacing.
pub mod pacing {
    use std::time::Duration;

    /// Minimum gap between two pulses to the same device, in milliseconds.
    pub const COMMAND_INTERVAL_MS: u64 = 300;

    /// Minimum gap between two pulses to the same device.
    pub const fn command_interval() -> Duration {
        Duration::from_millis(COMMAND_INTERVAL_MS)
    }
}

/// Color temperature range. Level 1 is the warmest preset, the last level the coolest.
pub mod kelvin {
    pub const MIN: u16 = 2700;
    pub const MAX: u16 = 6500;
}

/// Accepted level counts.
pub mod limits {
    pub const BRIGHTNESS_LEVELS_MIN: u8 = 2;
    pub const BRIGHTNESS_LEVELS_MAX: u8 = 100;
    pub const CCT_LEVELS_MIN: u8 = 2;
    pub const CCT_LEVELS_MAX: u8 = 20;
}

/// Environment variable names.
pub mod env_vars {
    pub const CONFIG_PATH: &str = "RFLAMP_CONFIG";
    pub const STATE_DB: &str = "RFLAMP_STATE_DB";
    pub const HA_TOKEN: &str = "RFLAMP_HA_TOKEN";
    pub const LOG_JSON: &str = "RFLAMP_LOG_JSON";
}

/// Default file locations.
pub mod paths {
    pub const CONFIG: &str = "rflamp.toml";
    pub const STATE_DB: &str = "data/lamp_state.redb";
}

/// Static configuration of one lamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LampConfig {
    /// Display name
    pub lamp_name: String,
    /// Remote entity that emits the pulses (e.g. "remote.living_room")
    pub remote_entity_id: String,
    /// Device name the commands were learned under on the remote
    pub device_name: String,
    /// Number of brightness steps, absent if the lamp has no dimming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness_levels: Option<u8>,
    /// Number of color temperature presets, absent if the lamp has no CCT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cct_levels: Option<u8>,
}

impl LampConfig {
    /// Create an on/off-only lamp configuration.
    pub fn new(
        lamp_name: impl Into<String>,
        remote_entity_id: impl Into<String>,
        device_name: impl Into<String>,
    ) -> Self {
        Self {
            lamp_name: lamp_name.into(),
            remote_entity_id: remote_entity_id.into(),
            device_name: device_name.into(),
            brightness_levels: None,
            cct_levels: None,
        }
    }

    /// Set the number of brightness steps.
    pub fn with_brightness_levels(mut self, levels: u8) -> Self {
        self.brightness_levels = Some(levels);
        self
    }

    /// Set the number of color temperature presets.
    pub fn with_cct_levels(mut self, levels: u8) -> Self {
        self.cct_levels = Some(levels);
        self
    }

    /// Unique identifier of the lamp: one device name per remote.
    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.remote_entity_id, self.device_name)
    }

    /// Validate the configuration and derive the device capabilities.
    pub fn validate(&self) -> Result<DeviceCapabilities> {
        for (field, value) in [
            ("lamp_name", &self.lamp_name),
            ("remote_entity_id", &self.remote_entity_id),
            ("device_name", &self.device_name),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Configuration(format!("{} must not be empty", field)));
            }
        }

        DeviceCapabilities::new(self.brightness_levels, self.cct_levels)
    }

    /// Pacing interval used for this lamp.
    pub fn command_interval(&self) -> Duration {
        pacing::command_interval()
    }
}
