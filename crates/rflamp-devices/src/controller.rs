//! Lamp controller.
//!
//! Provides:
//! - Power on/off through the toggle pulse
//! - Brightness and color temperature adjustment through relative pulses
//! - One-shot restore of the assumed state from a previous session
//!
//! Every operation holds the lamp's lock for its whole duration, pacing delays
//! included, so the pulses of two operations never interleave. The lock is a
//! fair async mutex: queued operations run in arrival order.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use rflamp_commands::{CommandTarget, CommandTransport, PacedEmitter};
use rflamp_core::{
    Axis, CoreError, DeviceCapabilities, DeviceState, LampCommand, LampConfig, ReportedState,
    brightness_to_level, kelvin_to_level, sequence_for,
};

use crate::descriptor::LampDescriptor;
use crate::error::{LampError, Result};

/// Targets for a turn-on. Absent targets leave the axis where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnOnRequest {
    /// Target brightness on the 1-255 scale
    #[serde(default)]
    pub brightness: Option<u8>,
    /// Target color temperature in Kelvin
    #[serde(default)]
    pub color_temp_kelvin: Option<u16>,
}

impl TurnOnRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_color_temp(mut self, kelvin: u16) -> Self {
        self.color_temp_kelvin = Some(kelvin);
        self
    }
}

struct ControllerInner {
    state: DeviceState,
    emitter: PacedEmitter,
    /// Set by the first operation; restore is refused afterwards.
    started: bool,
    /// Set once the registry let go of this controller.
    retired: bool,
}

impl ControllerInner {
    /// Claim the controller for an operation.
    fn begin(&mut self, lamp: &str) -> Result<()> {
        if self.retired {
            return Err(LampError::Unloaded(lamp.to_string()));
        }
        self.started = true;
        Ok(())
    }

    /// Move one axis to `target_level`, recording the level only once every
    /// pulse was sent.
    async fn adjust(&mut self, lamp: &str, axis: Axis, target_level: u8) -> Result<()> {
        let capabilities = *self.state.capabilities();
        let (current, levels) = match axis {
            Axis::Brightness => (self.state.brightness_level(), capabilities.brightness_levels()),
            Axis::ColorTemp => (self.state.cct_level(), capabilities.cct_levels()),
        };
        let (Some(current), Some(levels)) = (current, levels) else {
            return Err(CoreError::InvalidTarget(format!("{} is not supported", axis)).into());
        };

        let sequence = sequence_for(axis, current, target_level, levels);
        if sequence.is_empty() {
            debug!(lamp = %lamp, axis = %axis, level = current, "Already at target level");
            return Ok(());
        }

        debug!(
            lamp = %lamp,
            axis = %axis,
            from = current,
            to = target_level,
            pulses = sequence.len(),
            "Adjusting"
        );
        self.emitter.emit(&sequence).await?;

        match axis {
            Axis::Brightness => self.state.set_brightness_level(target_level)?,
            Axis::ColorTemp => self.state.set_cct_level(target_level)?,
        }
        Ok(())
    }

    async fn power_on(&mut self, lamp: &str) -> Result<()> {
        self.emitter.send(LampCommand::Toggle).await?;
        self.state.set_power(true);
        info!(lamp = %lamp, "Lamp turned on");
        Ok(())
    }
}

/// Controller for one lamp.
pub struct LampController {
    name: String,
    unique_id: String,
    capabilities: DeviceCapabilities,
    inner: Mutex<ControllerInner>,
}

impl LampController {
    /// Create a controller from a lamp configuration.
    ///
    /// Fails when the configuration does not validate. The lamp starts out
    /// assumed off, at full brightness and the warmest color temperature.
    pub fn new(config: &LampConfig, transport: Arc<dyn CommandTransport>) -> Result<Self> {
        let capabilities = config.validate()?;
        let emitter = PacedEmitter::new(transport, CommandTarget::from(config))
            .with_interval(config.command_interval());

        Ok(Self {
            name: config.lamp_name.clone(),
            unique_id: config.unique_id(),
            capabilities,
            inner: Mutex::new(ControllerInner {
                state: DeviceState::new(capabilities),
                emitter,
                started: false,
                retired: false,
            }),
        })
    }

    /// Override the pacing interval.
    pub fn with_command_interval(mut self, interval: Duration) -> Self {
        self.inner.get_mut().emitter.set_interval(interval);
        self
    }

    /// Keep pacing from the last pulse a previous controller sent to this lamp.
    pub fn with_pacing_after(mut self, last_sent: Option<Instant>) -> Self {
        self.inner.get_mut().emitter.resume_after(last_sent);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn descriptor(&self) -> LampDescriptor {
        LampDescriptor::new(&self.unique_id, &self.name, &self.capabilities)
    }

    /// Overwrite the assumed state with the last state of a previous session.
    ///
    /// No command is sent. Only allowed before any other operation.
    pub async fn restore_state(
        &self,
        is_on: bool,
        brightness: Option<u8>,
        color_temp_kelvin: Option<u16>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.started {
            return Err(LampError::AlreadyStarted(self.name.clone()));
        }
        inner.begin(&self.name)?;
        inner.state.restore(is_on, brightness, color_temp_kelvin);

        debug!(
            lamp = %self.name,
            is_on,
            brightness_level = ?inner.state.brightness_level(),
            cct_level = ?inner.state.cct_level(),
            "Restored state"
        );
        Ok(())
    }

    /// Turn the lamp on and move it to the requested targets.
    ///
    /// Targets on unsupported axes are ignored. If the lamp is already on no
    /// toggle is sent and only the adjustments run.
    pub async fn turn_on(&self, request: TurnOnRequest) -> Result<ReportedState> {
        let mut inner = self.inner.lock().await;
        inner.begin(&self.name)?;

        let brightness_target = match (request.brightness, self.capabilities.brightness_levels()) {
            (Some(brightness), Some(levels)) => Some(brightness_to_level(brightness, levels)),
            (Some(brightness), None) => {
                debug!(lamp = %self.name, brightness, "Ignoring brightness target, not supported");
                None
            }
            (None, _) => None,
        };
        let cct_target = match (request.color_temp_kelvin, self.capabilities.cct_levels()) {
            (Some(kelvin), Some(levels)) => Some(kelvin_to_level(kelvin, levels)),
            (Some(kelvin), None) => {
                debug!(lamp = %self.name, kelvin, "Ignoring color temperature target, not supported");
                None
            }
            (None, _) => None,
        };

        if inner.state.is_on() {
            debug!(lamp = %self.name, "Already on, skipping toggle");
        } else {
            inner.power_on(&self.name).await?;
            if brightness_target.is_some() || cct_target.is_some() {
                // The lamp needs a moment after powering up before it takes steps
                inner.emitter.settle().await;
            }
        }

        if let Some(level) = brightness_target {
            inner.adjust(&self.name, Axis::Brightness, level).await?;
        }
        if let Some(level) = cct_target {
            inner.adjust(&self.name, Axis::ColorTemp, level).await?;
        }

        Ok(inner.state.reported())
    }

    /// Turn the lamp off. Does nothing if it is already off.
    pub async fn turn_off(&self) -> Result<ReportedState> {
        let mut inner = self.inner.lock().await;
        inner.begin(&self.name)?;

        if !inner.state.is_on() {
            debug!(lamp = %self.name, "Already off, skipping toggle");
            return Ok(inner.state.reported());
        }

        inner.emitter.send(LampCommand::Toggle).await?;
        inner.state.set_power(false);
        info!(lamp = %self.name, "Lamp turned off");

        Ok(inner.state.reported())
    }

    /// Move brightness to `brightness` (1-255 scale) while the lamp is on.
    pub async fn set_brightness(&self, brightness: u8) -> Result<ReportedState> {
        let levels = self
            .capabilities
            .brightness_levels()
            .ok_or_else(|| CoreError::InvalidTarget("brightness is not supported".to_string()))?;
        self.adjust_while_on(Axis::Brightness, brightness_to_level(brightness, levels))
            .await
    }

    /// Move color temperature to `kelvin` while the lamp is on.
    pub async fn set_color_temp(&self, kelvin: u16) -> Result<ReportedState> {
        let levels = self.capabilities.cct_levels().ok_or_else(|| {
            CoreError::InvalidTarget("color temperature is not supported".to_string())
        })?;
        self.adjust_while_on(Axis::ColorTemp, kelvin_to_level(kelvin, levels))
            .await
    }

    async fn adjust_while_on(&self, axis: Axis, target_level: u8) -> Result<ReportedState> {
        let mut inner = self.inner.lock().await;
        inner.begin(&self.name)?;

        if !inner.state.is_on() {
            return Err(LampError::PoweredOff(self.name.clone()));
        }

        inner.adjust(&self.name, axis, target_level).await?;
        Ok(inner.state.reported())
    }

    /// Stop accepting operations and hand over what a replacement needs.
    ///
    /// Waits for a running operation to finish. Operations queued behind it,
    /// and any issued later, fail with [`LampError::Unloaded`]. Returns the
    /// final state and when the last pulse went out.
    pub async fn retire(&self) -> (ReportedState, Option<Instant>) {
        let mut inner = self.inner.lock().await;
        inner.retired = true;
        (inner.state.reported(), inner.emitter.last_sent())
    }

    /// Current state in external units. Waits for a running operation to finish.
    pub async fn reported_state(&self) -> ReportedState {
        self.inner.lock().await.state.reported()
    }

    /// Copy of the assumed state, levels included.
    pub async fn snapshot(&self) -> DeviceState {
        self.inner.lock().await.state.clone()
    }
}

impl std::fmt::Debug for LampController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LampController")
            .field("name", &self.name)
            .field("unique_id", &self.unique_id)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
