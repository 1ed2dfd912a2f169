//! Home Assistant transport.
//!
//! Calls the `remote.send_command` service through the REST API, which makes
//! whichever IR/RF blaster backs the remote entity emit the learned command.
//!
//! ## Configuration
//!
//! ```toml
//! [home_assistant]
//! url = "http://homeassistant.local:8123"
//! token_env = "RFLAMP_HA_TOKEN"
//! timeout_secs = 10
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rflamp_core::LampCommand;
use rflamp_core::config::env_vars;

use crate::transport::{CommandTarget, CommandTransport, TransportError};

/// Home Assistant connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAssistantConfig {
    /// Base URL of the Home Assistant instance
    pub url: String,
    /// Long-lived access token (prefer `token_env`)
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_token_env() -> String {
    env_vars::HA_TOKEN.to_string()
}

fn default_timeout() -> u64 {
    10
}

impl HomeAssistantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            token_env: default_token_env(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the access token directly.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Resolve the access token, from the config first and the environment second.
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(&self.token_env).ok())
            .filter(|token| !token.is_empty())
    }
}

/// Transport calling `remote.send_command` on Home Assistant.
pub struct HomeAssistantTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HomeAssistantTransport {
    /// Create a transport from the connection settings.
    pub fn new(config: &HomeAssistantConfig) -> Result<Self, TransportError> {
        let token = config.resolve_token().ok_or_else(|| {
            TransportError::NotConfigured(format!(
                "no access token, set {} or home_assistant.token",
                config.token_env
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Service endpoint for sending remote commands.
    pub fn service_url(&self) -> String {
        format!("{}/api/services/remote/send_command", self.base_url)
    }

    fn payload(target: &CommandTarget, command: LampCommand) -> serde_json::Value {
        serde_json::json!({
            "entity_id": target.remote_entity_id,
            "device": target.device_name,
            "command": command.as_str(),
        })
    }
}

#[async_trait]
impl CommandTransport for HomeAssistantTransport {
    async fn send(
        &self,
        target: &CommandTarget,
        command: LampCommand,
    ) -> Result<(), TransportError> {
        let url = self.service_url();
        debug!(url = %url, target_device = %target, command = %command, "Calling remote.send_command");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&Self::payload(target, command))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else if e.is_connect() {
                    TransportError::ConnectionFailed(e.to_string())
                } else {
                    TransportError::SendFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), target_device = %target, command = %command, "Home Assistant rejected command");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "home-assistant"
    }
}
