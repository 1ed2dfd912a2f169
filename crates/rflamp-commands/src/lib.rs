//! Command emission for one-way lamps.
//!
//! Provides:
//! - The transport seam through which named commands reach a remote
//! - A Home Assistant transport (`http` feature) and a dry-run transport
//! - A paced emitter that keeps the minimum gap between pulses

pub mod emitter;
#[cfg(feature = "http")]
pub mod http;
pub mod transport;

// Re-exports
pub use rflamp_core::LampCommand;

pub use emitter::PacedEmitter;

pub use transport::{CommandTarget, CommandTransport, DryRunTransport, TransportError};

#[cfg(feature = "http")]
pub use http::{HomeAssistantConfig, HomeAssistantTransport};
