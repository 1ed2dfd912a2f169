//! Lamp controllers and their registry.
//!
//! Provides:
//! - [`LampController`]: serialized power and adjustment operations for one lamp
//! - [`LampRegistry`]: setup, unload and reload of configured lamps, with the
//!   last known state saved after every operation
//! - [`LampDescriptor`] and [`ColorMode`]: how a lamp presents itself

pub mod controller;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use controller::{LampController, TurnOnRequest};
pub use descriptor::{ColorMode, LampDescriptor};
pub use error::{LampError, Result};
pub use registry::LampRegistry;
