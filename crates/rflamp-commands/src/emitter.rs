//! Paced command emission.
//!
//! The lamp reads every pulse as "one more step" and merges pulses that arrive
//! too close together, so consecutive commands to one device are kept at
//! least one pacing interval apart. The emitter belongs to a single lamp and
//! is driven by one operation at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use rflamp_core::config::pacing;
use rflamp_core::{CommandSequence, LampCommand};

use crate::transport::{CommandTarget, CommandTransport, TransportError};

/// Sends commands to one device with a minimum gap between them.
pub struct PacedEmitter {
    transport: Arc<dyn CommandTransport>,
    target: CommandTarget,
    interval: Duration,
    last_sent: Option<Instant>,
}

impl PacedEmitter {
    /// Create an emitter using the default pacing interval.
    pub fn new(transport: Arc<dyn CommandTransport>, target: CommandTarget) -> Self {
        Self {
            transport,
            target,
            interval: pacing::command_interval(),
            last_sent: None,
        }
    }

    /// Override the pacing interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// When the last command was attempted, if any.
    pub fn last_sent(&self) -> Option<Instant> {
        self.last_sent
    }

    /// Take over the pacing of an earlier emitter for the same device, so a
    /// replacement emitter still keeps the gap to that emitter's last pulse.
    pub fn resume_after(&mut self, last_sent: Option<Instant>) {
        self.last_sent = self.last_sent.max(last_sent);
    }

    pub fn target(&self) -> &CommandTarget {
        &self.target
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next command may be sent.
    ///
    /// Returns immediately when nothing was sent within the last interval.
    pub async fn settle(&self) {
        if let Some(last) = self.last_sent {
            let deadline = last + self.interval;
            if Instant::now() < deadline {
                tokio::time::sleep_until(deadline).await;
            }
        }
    }

    /// Send one command, waiting out the pacing gap first.
    ///
    /// The gap is measured from the previous attempt even if it failed, since
    /// a failed request may still have produced a pulse.
    pub async fn send(&mut self, command: LampCommand) -> Result<(), TransportError> {
        self.settle().await;

        debug!(
            command = %command,
            device = %self.target.device_name,
            remote = %self.target.remote_entity_id,
            transport = self.transport.name(),
            "Sending command"
        );

        let result = self.transport.send(&self.target, command).await;
        self.last_sent = Some(Instant::now());
        result
    }

    /// Send every command of a sequence in order.
    ///
    /// Stops at the first failure. Already sent pulses are not retried or
    /// reversed since nothing tells how many of them the lamp registered.
    pub async fn emit(&mut self, sequence: &CommandSequence) -> Result<(), TransportError> {
        let total = sequence.len();
        for (sent, command) in sequence.commands().enumerate() {
            if let Err(e) = self.send(command).await {
                warn!(
                    device = %self.target.device_name,
                    command = %command,
                    sent,
                    total,
                    error = %e,
                    "Command sequence aborted"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}
