//! Static description of a lamp for whatever lists or exposes it.

use serde::{Deserialize, Serialize};

use rflamp_core::DeviceCapabilities;
use rflamp_core::config::kelvin;

/// How a lamp's color can be controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[serde(rename = "onoff")]
    OnOff,
    Brightness,
    ColorTemp,
}

impl ColorMode {
    /// The single mode a lamp with these capabilities supports.
    ///
    /// Color temperature implies brightness control in the external model, so
    /// a CCT lamp reports `ColorTemp` whether or not it can dim.
    pub fn for_capabilities(capabilities: &DeviceCapabilities) -> Self {
        if capabilities.supports_cct() {
            ColorMode::ColorTemp
        } else if capabilities.supports_brightness() {
            ColorMode::Brightness
        } else {
            ColorMode::OnOff
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::OnOff => f.write_str("onoff"),
            ColorMode::Brightness => f.write_str("brightness"),
            ColorMode::ColorTemp => f.write_str("color_temp"),
        }
    }
}

/// Identity and capabilities of a lamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LampDescriptor {
    /// Unique id (remote entity and device name)
    pub unique_id: String,
    /// Display name
    pub name: String,
    /// Supported color modes
    pub supported_color_modes: Vec<ColorMode>,
    /// Active color mode
    pub color_mode: ColorMode,
    /// Warmest color temperature, CCT lamps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_color_temp_kelvin: Option<u16>,
    /// Coolest color temperature, CCT lamps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_color_temp_kelvin: Option<u16>,
}

impl LampDescriptor {
    pub fn new(unique_id: &str, name: &str, capabilities: &DeviceCapabilities) -> Self {
        let color_mode = ColorMode::for_capabilities(capabilities);
        let supports_cct = capabilities.supports_cct();

        Self {
            unique_id: unique_id.to_string(),
            name: name.to_string(),
            supported_color_modes: vec![color_mode],
            color_mode,
            min_color_temp_kelvin: supports_cct.then_some(kelvin::MIN),
            max_color_temp_kelvin: supports_cct.then_some(kelvin::MAX),
        }
    }
}
