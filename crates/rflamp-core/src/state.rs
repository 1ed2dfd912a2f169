//! Assumed device state.
//!
//! The lamp never reports back, so [`DeviceState`] is what the controller
//! believes the lamp is doing. It drifts whenever a pulse is lost, and only a
//! restore from persisted state can bring it back in line.

use serde::{Deserialize, Serialize};

use crate::config::limits;
use crate::error::{CoreError, Result};
use crate::level::{brightness_to_level, kelvin_to_level, level_to_brightness, level_to_kelvin};

/// Static capability limits of a lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    brightness_levels: Option<u8>,
    cct_levels: Option<u8>,
}

impl DeviceCapabilities {
    /// Create capabilities, rejecting level counts outside the accepted ranges.
    pub fn new(brightness_levels: Option<u8>, cct_levels: Option<u8>) -> Result<Self> {
        if let Some(levels) = brightness_levels {
            check_range(
                "brightness_levels",
                levels,
                limits::BRIGHTNESS_LEVELS_MIN,
                limits::BRIGHTNESS_LEVELS_MAX,
            )?;
        }
        if let Some(levels) = cct_levels {
            check_range("cct_levels", levels, limits::CCT_LEVELS_MIN, limits::CCT_LEVELS_MAX)?;
        }

        Ok(Self {
            brightness_levels,
            cct_levels,
        })
    }

    /// Capabilities of a lamp that can only be toggled.
    pub const fn on_off() -> Self {
        Self {
            brightness_levels: None,
            cct_levels: None,
        }
    }

    pub fn brightness_levels(&self) -> Option<u8> {
        self.brightness_levels
    }

    pub fn cct_levels(&self) -> Option<u8> {
        self.cct_levels
    }

    pub fn supports_brightness(&self) -> bool {
        self.brightness_levels.is_some()
    }

    pub fn supports_cct(&self) -> bool {
        self.cct_levels.is_some()
    }
}

fn check_range(field: &str, value: u8, min: u8, max: u8) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Configuration(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )))
    }
}

/// Power state as reported and persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    #[default]
    Off,
}

impl PowerState {
    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }
}

impl From<bool> for PowerState {
    fn from(is_on: bool) -> Self {
        if is_on { PowerState::On } else { PowerState::Off }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerState::On => f.write_str("on"),
            PowerState::Off => f.write_str("off"),
        }
    }
}

/// State in external units, for whatever publishes or persists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportedState {
    /// Power state
    pub power: PowerState,
    /// Brightness on the 1-255 scale, absent when off or unsupported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    /// Color temperature in Kelvin, absent when off or unsupported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temp_kelvin: Option<u16>,
}

/// Assumed state of one lamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    capabilities: DeviceCapabilities,
    is_on: bool,
    brightness_level: Option<u8>,
    cct_level: Option<u8>,
}

impl DeviceState {
    /// Create the initial state: off, full brightness, warmest color temperature.
    pub fn new(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            is_on: false,
            brightness_level: capabilities.brightness_levels(),
            cct_level: capabilities.cct_levels().map(|_| 1),
        }
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn brightness_level(&self) -> Option<u8> {
        self.brightness_level
    }

    pub fn cct_level(&self) -> Option<u8> {
        self.cct_level
    }

    /// Record a power change. Levels are kept so the next power-on resumes there.
    pub fn set_power(&mut self, is_on: bool) {
        self.is_on = is_on;
    }

    /// Record a reached brightness level.
    pub fn set_brightness_level(&mut self, level: u8) -> Result<()> {
        let levels = self
            .capabilities
            .brightness_levels()
            .ok_or_else(|| CoreError::InvalidTarget("brightness is not supported".to_string()))?;
        self.brightness_level = Some(check_level("brightness", level, levels)?);
        Ok(())
    }

    /// Record a reached color temperature level.
    pub fn set_cct_level(&mut self, level: u8) -> Result<()> {
        let levels = self.capabilities.cct_levels().ok_or_else(|| {
            CoreError::InvalidTarget("color temperature is not supported".to_string())
        })?;
        self.cct_level = Some(check_level("color temperature", level, levels)?);
        Ok(())
    }

    /// Overwrite the state from a previous session without commanding the lamp.
    ///
    /// Values for unsupported axes, and zero values, are ignored and the
    /// corresponding level keeps its current value.
    pub fn restore(&mut self, is_on: bool, brightness: Option<u8>, color_temp_kelvin: Option<u16>) {
        self.is_on = is_on;

        if let (Some(levels), Some(brightness)) = (
            self.capabilities.brightness_levels(),
            brightness.filter(|b| *b > 0),
        ) {
            self.brightness_level = Some(brightness_to_level(brightness, levels));
        }

        if let (Some(levels), Some(temp)) = (
            self.capabilities.cct_levels(),
            color_temp_kelvin.filter(|k| *k > 0),
        ) {
            self.cct_level = Some(kelvin_to_level(temp, levels));
        }
    }

    /// Reported brightness on the 1-255 scale.
    pub fn reported_brightness(&self) -> Option<u8> {
        level_to_brightness(
            self.brightness_level?,
            self.capabilities.brightness_levels(),
            self.is_on,
        )
    }

    /// Reported color temperature in Kelvin.
    pub fn reported_color_temp(&self) -> Option<u16> {
        level_to_kelvin(self.cct_level?, self.capabilities.cct_levels(), self.is_on)
    }

    /// Snapshot in external units.
    pub fn reported(&self) -> ReportedState {
        ReportedState {
            power: self.is_on.into(),
            brightness: self.reported_brightness(),
            color_temp_kelvin: self.reported_color_temp(),
        }
    }
}

fn check_level(axis: &str, level: u8, levels: u8) -> Result<u8> {
    if (1..=levels).contains(&level) {
        Ok(level)
    } else {
        Err(CoreError::InvalidTarget(format!(
            "{} level {} outside 1..={}",
            axis, level, levels
        )))
    }
}
