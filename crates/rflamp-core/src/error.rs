//! Error types for the core crate.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Configuration rejected at construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Target requested on an axis the device does not support, or outside its levels.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}
