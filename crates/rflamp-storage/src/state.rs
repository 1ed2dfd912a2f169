//! Persisted lamp state record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rflamp_core::{PowerState, ReportedState};

/// Last state reported for a lamp, in external units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKnownState {
    /// Power state
    pub power: PowerState,
    /// Brightness on the 1-255 scale, only stored while on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    /// Color temperature in Kelvin, only stored while on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temp_kelvin: Option<u16>,
    /// When the state was saved
    pub updated_at: DateTime<Utc>,
}

impl LastKnownState {
    pub fn is_on(&self) -> bool {
        self.power.is_on()
    }
}

impl From<ReportedState> for LastKnownState {
    fn from(state: ReportedState) -> Self {
        Self {
            power: state.power,
            brightness: state.brightness,
            color_temp_kelvin: state.color_temp_kelvin,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let state = LastKnownState::from(ReportedState {
            power: PowerState::On,
            brightness: Some(153),
            color_temp_kelvin: None,
        });

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["power"], "on");
        assert_eq!(json["brightness"], 153);
        assert!(json.get("color_temp_kelvin").is_none());
    }
}
