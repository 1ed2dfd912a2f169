//! Common test utilities for lamp tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use rflamp_commands::{CommandTarget, CommandTransport, LampCommand, TransportError};
use rflamp_core::LampConfig;

/// A command as the transport received it.
#[derive(Debug, Clone)]
pub struct SentCommand {
    pub at: Instant,
    pub target: CommandTarget,
    pub command: LampCommand,
}

/// Transport that records every command and can be told to fail.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentCommand>>,
    fail_on_call: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the call with the given zero-based index, and every call after it.
    pub fn failing_on(call: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_on_call: Some(call),
            ..Default::default()
        })
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<LampCommand> {
        self.sent().into_iter().map(|s| s.command).collect()
    }

    pub fn gaps(&self) -> Vec<Duration> {
        self.sent().windows(2).map(|w| w[1].at - w[0].at).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl CommandTransport for RecordingTransport {
    async fn send(&self, target: &CommandTarget, command: LampCommand) -> Result<(), TransportError> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_on_call.is_some_and(|call| sent.len() >= call) {
            return Err(TransportError::SendFailed("remote unavailable".to_string()));
        }
        sent.push(SentCommand {
            at: Instant::now(),
            target: target.clone(),
            command,
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Dimmable CCT lamp: 10 brightness levels, 4 color temperature presets.
pub fn desk_lamp() -> LampConfig {
    LampConfig::new("Desk", "remote.office", "desk")
        .with_brightness_levels(10)
        .with_cct_levels(4)
}

/// Lamp with brightness control only.
pub fn dimmer() -> LampConfig {
    LampConfig::new("Hallway", "remote.hall", "ceiling").with_brightness_levels(10)
}

/// Lamp that can only be toggled.
pub fn switch_lamp() -> LampConfig {
    LampConfig::new("Porch", "remote.porch", "porch")
}

pub fn repeat(command: LampCommand, count: usize) -> Vec<LampCommand> {
    std::iter::repeat(command).take(count).collect()
}
