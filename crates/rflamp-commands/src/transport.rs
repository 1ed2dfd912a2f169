//! Transport seam for sending named commands to a remote.
//!
//! A transport is fire-and-forget: success means the remote accepted the
//! request, never that the lamp reacted to it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use rflamp_core::{LampCommand, LampConfig};

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Timeout waiting for remote")]
    Timeout,

    #[error("Remote rejected command with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport not configured: {0}")]
    NotConfigured(String),
}

/// Where a command goes: a device learned on a remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandTarget {
    /// Remote entity that emits the pulse
    pub remote_entity_id: String,
    /// Device name the commands were learned under
    pub device_name: String,
}

impl CommandTarget {
    pub fn new(remote_entity_id: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self {
            remote_entity_id: remote_entity_id.into(),
            device_name: device_name.into(),
        }
    }
}

impl From<&LampConfig> for CommandTarget {
    fn from(config: &LampConfig) -> Self {
        Self::new(config.remote_entity_id.clone(), config.device_name.clone())
    }
}

impl std::fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.remote_entity_id, self.device_name)
    }
}

/// One-way command sender.
///
/// Implementations may be shared by many lamps; pacing and ordering for a
/// single lamp are handled by the caller.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Send one command.
    async fn send(&self, target: &CommandTarget, command: LampCommand)
    -> Result<(), TransportError>;

    /// Short transport name for logs.
    fn name(&self) -> &str;
}

/// Transport that only logs, for trying out configurations.
#[derive(Debug, Clone, Default)]
pub struct DryRunTransport;

impl DryRunTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandTransport for DryRunTransport {
    async fn send(
        &self,
        target: &CommandTarget,
        command: LampCommand,
    ) -> Result<(), TransportError> {
        info!(target_device = %target, command = %command, "dry run: command not sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
