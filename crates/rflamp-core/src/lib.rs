//! Core model for one-way RF/IR lamps.
//!
//! Provides:
//! - Level conversion between the external brightness/Kelvin scales and device levels
//! - The assumed device state and its capabilities
//! - Command sequencing for relative step and cycle commands
//! - Lamp configuration and validation
//!
//! Nothing in this crate performs I/O. Emitting commands and persisting state
//! are handled by `rflamp-commands` and `rflamp-storage`.

pub mod command;
pub mod config;
pub mod error;
pub mod level;
pub mod sequencer;
pub mod state;

// Re-exports
pub use command::LampCommand;

pub use config::LampConfig;

pub use error::{CoreError, Result};

pub use level::{brightness_to_level, kelvin_to_level, level_to_brightness, level_to_kelvin};

pub use sequencer::{
    Axis, CommandRun, CommandSequence, sequence_brightness, sequence_cct, sequence_for,
};

pub use state::{DeviceCapabilities, DeviceState, PowerState, ReportedState};
