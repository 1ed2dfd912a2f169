//! Command vocabulary understood by the remote.

use serde::{Deserialize, Serialize};

/// A single one-way command.
///
/// The names are the ones learned on the remote, so they are sent verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LampCommand {
    /// Power toggle. Turns the lamp on when off and off when on.
    Toggle,
    /// One brightness step up.
    BrightnessUp,
    /// One brightness step down.
    BrightnessDown,
    /// Advance the color temperature to the next preset, wrapping after the last.
    CctToggle,
}

impl LampCommand {
    /// All commands a remote must have learned for a fully featured lamp.
    pub const ALL: &'static [LampCommand] = &[
        LampCommand::Toggle,
        LampCommand::BrightnessUp,
        LampCommand::BrightnessDown,
        LampCommand::CctToggle,
    ];

    /// Get the command name as sent to the remote.
    pub fn as_str(&self) -> &'static str {
        match self {
            LampCommand::Toggle => "toggle",
            LampCommand::BrightnessUp => "brightness_up",
            LampCommand::BrightnessDown => "brightness_down",
            LampCommand::CctToggle => "cct_toggle",
        }
    }
}

impl std::fmt::Display for LampCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
