//! Lamp operation errors.

use thiserror::Error;

use rflamp_commands::TransportError;
use rflamp_core::CoreError;

/// Result type for lamp operations.
pub type Result<T> = std::result::Result<T, LampError>;

/// Errors raised by lamp controllers and the registry.
#[derive(Debug, Error)]
pub enum LampError {
    /// Invalid configuration or target
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A command could not be sent
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Persisted state could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] rflamp_storage::Error),

    /// Direct adjustment requested while the lamp is off
    #[error("Lamp is off: {0}")]
    PoweredOff(String),

    /// Restore requested after the lamp was already operated
    #[error("Lamp already started: {0}")]
    AlreadyStarted(String),

    /// Operation on a controller that was unloaded or replaced by a reload
    #[error("Lamp was unloaded: {0}")]
    Unloaded(String),

    /// A lamp with the same unique id is already set up
    #[error("Already exists: {0}")]
    DuplicateEntry(String),

    /// No lamp matches the given id or name
    #[error("Lamp not found: {0}")]
    UnknownLamp(String),
}

impl LampError {
    /// Whether the error came from the transport, meaning pulses may be lost.
    pub fn is_transport(&self) -> bool {
        matches!(self, LampError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_pass_through() {
        let core = CoreError::InvalidTarget("brightness is not supported".into());
        let err = LampError::from(core.clone());
        assert_eq!(err.to_string(), core.to_string());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_error() {
        let err = LampError::from(TransportError::Timeout);
        assert!(err.is_transport());
        assert!(err.to_string().starts_with("Transport error"));
    }
}
