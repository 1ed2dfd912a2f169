//! Lamp registry.
//!
//! Owns the configured lamps and their lifecycle:
//! - Setup validates the entry, restores its last known state and registers it
//! - Unload retires the controller, keeping the persisted state
//! - Reload retires the controller, persists its state and sets the entry up
//!   again with a new configuration, carrying the pacing over
//!
//! Operations routed through the registry save the lamp's reported state after
//! they finish, so a later setup can catch the assumed state up.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use rflamp_commands::CommandTransport;
use rflamp_core::{LampConfig, ReportedState};
use rflamp_storage::{LastKnownState, StateStore};

use crate::controller::{LampController, TurnOnRequest};
use crate::descriptor::LampDescriptor;
use crate::error::{LampError, Result};

struct LampEntry {
    config: LampConfig,
    controller: Arc<LampController>,
    /// Set while a reload of this entry is running.
    reloading: Arc<AtomicBool>,
}

/// Clears the reload flag when the reload ends, however it ends.
struct ReloadGuard(Arc<AtomicBool>);

impl Drop for ReloadGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Registry of set-up lamps, keyed by unique id.
pub struct LampRegistry {
    transport: Arc<dyn CommandTransport>,
    store: Arc<dyn StateStore>,
    command_interval: Option<Duration>,
    entries: RwLock<HashMap<String, LampEntry>>,
}

impl LampRegistry {
    /// Create an empty registry sharing one transport and one store across lamps.
    pub fn new(transport: Arc<dyn CommandTransport>, store: Arc<dyn StateStore>) -> Self {
        Self {
            transport,
            store,
            command_interval: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Override the pacing interval of every lamp set up afterwards.
    pub fn with_command_interval(mut self, interval: Duration) -> Self {
        self.command_interval = Some(interval);
        self
    }

    /// Set up a lamp.
    ///
    /// The persisted state, if any, is restored before the controller is
    /// registered. An unreadable persisted state is logged and the lamp starts
    /// from its defaults.
    pub async fn setup_entry(&self, config: LampConfig) -> Result<Arc<LampController>> {
        let unique_id = config.unique_id();
        if self.entries.read().await.contains_key(&unique_id) {
            return Err(LampError::DuplicateEntry(unique_id));
        }

        let controller = Arc::new(self.build_controller(&config).await?);

        let mut entries = self.entries.write().await;
        if entries.contains_key(&unique_id) {
            return Err(LampError::DuplicateEntry(unique_id));
        }
        entries.insert(
            unique_id.clone(),
            LampEntry {
                config,
                controller: controller.clone(),
                reloading: Arc::new(AtomicBool::new(false)),
            },
        );

        info!(lamp = %controller.name(), unique_id = %unique_id, "Lamp set up");
        Ok(controller)
    }

    async fn build_controller(&self, config: &LampConfig) -> Result<LampController> {
        let mut controller = LampController::new(config, self.transport.clone())?;
        if let Some(interval) = self.command_interval {
            controller = controller.with_command_interval(interval);
        }

        match self.store.load(controller.unique_id()) {
            Ok(Some(saved)) => {
                controller
                    .restore_state(saved.is_on(), saved.brightness, saved.color_temp_kelvin)
                    .await?;
                info!(
                    lamp = %controller.name(),
                    power = %saved.power,
                    saved_at = %saved.updated_at,
                    "Restored last known state"
                );
            }
            Ok(None) => debug!(lamp = %controller.name(), "No saved state, using defaults"),
            Err(e) => warn!(
                lamp = %controller.name(),
                error = %e,
                "Failed to load saved state, using defaults"
            ),
        }

        Ok(controller)
    }

    /// Remove a lamp. Returns whether it was set up.
    ///
    /// Waits for the lamp's running operation. Anyone still holding the
    /// controller gets [`LampError::Unloaded`] from then on.
    pub async fn unload_entry(&self, unique_id: &str) -> bool {
        let removed = self.entries.write().await.remove(unique_id);
        match removed {
            Some(entry) => {
                entry.controller.retire().await;
                info!(lamp = %entry.config.lamp_name, unique_id = %unique_id, "Lamp unloaded");
                true
            }
            None => false,
        }
    }

    /// Replace a lamp's configuration.
    ///
    /// Waits for the lamp's running operation, retires its controller and
    /// saves its state, then sets it up again from `config`. The new
    /// controller keeps pacing from the old one's last pulse. Returns `false`
    /// without doing anything when a reload of the same entry is already
    /// running.
    pub async fn reload_entry(&self, unique_id: &str, config: LampConfig) -> Result<bool> {
        let (controller, reloading) = {
            let entries = self.entries.read().await;
            let entry = entries
                .get(unique_id)
                .ok_or_else(|| LampError::UnknownLamp(unique_id.to_string()))?;
            (entry.controller.clone(), entry.reloading.clone())
        };

        if reloading.swap(true, Ordering::AcqRel) {
            debug!(unique_id = %unique_id, "Reload already in progress, skipping");
            return Ok(false);
        }
        let _guard = ReloadGuard(reloading);

        config.validate()?;
        let new_id = config.unique_id();
        if new_id != unique_id && self.entries.read().await.contains_key(&new_id) {
            return Err(LampError::DuplicateEntry(new_id));
        }

        // From here on the old controller refuses operations, so no pulse of
        // it can land between the snapshot and the new controller's first one.
        let (state, last_sent) = controller.retire().await;
        self.entries.write().await.remove(unique_id);
        drop(controller);

        self.store.save(&new_id, &LastKnownState::from(state))?;
        if new_id != unique_id {
            self.store.remove(unique_id)?;
        }

        let controller = Arc::new(
            self.build_controller(&config)
                .await?
                .with_pacing_after(last_sent),
        );
        let lamp_name = config.lamp_name.clone();
        self.entries.write().await.insert(
            new_id.clone(),
            LampEntry {
                config,
                controller,
                reloading: Arc::new(AtomicBool::new(false)),
            },
        );

        info!(lamp = %lamp_name, unique_id = %new_id, "Lamp reloaded");
        Ok(true)
    }

    /// Find a lamp by unique id, falling back to its name.
    pub async fn get(&self, key: &str) -> Option<Arc<LampController>> {
        let entries = self.entries.read().await;
        if let Some(entry) = entries.get(key) {
            return Some(entry.controller.clone());
        }
        entries
            .values()
            .find(|entry| entry.config.lamp_name == key)
            .map(|entry| entry.controller.clone())
    }

    /// Configuration a lamp was set up with.
    pub async fn config(&self, unique_id: &str) -> Option<LampConfig> {
        self.entries
            .read()
            .await
            .get(unique_id)
            .map(|entry| entry.config.clone())
    }

    /// Describe every lamp, sorted by name.
    pub async fn list(&self) -> Vec<LampDescriptor> {
        let mut lamps: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .map(|entry| entry.controller.descriptor())
            .collect();
        lamps.sort_by(|a, b| a.name.cmp(&b.name));
        lamps
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn turn_on(&self, key: &str, request: TurnOnRequest) -> Result<ReportedState> {
        let controller = self.require(key).await?;
        let result = controller.turn_on(request).await;
        self.finish(&controller, result).await
    }

    pub async fn turn_off(&self, key: &str) -> Result<ReportedState> {
        let controller = self.require(key).await?;
        let result = controller.turn_off().await;
        self.finish(&controller, result).await
    }

    pub async fn set_brightness(&self, key: &str, brightness: u8) -> Result<ReportedState> {
        let controller = self.require(key).await?;
        let result = controller.set_brightness(brightness).await;
        self.finish(&controller, result).await
    }

    pub async fn set_color_temp(&self, key: &str, kelvin: u16) -> Result<ReportedState> {
        let controller = self.require(key).await?;
        let result = controller.set_color_temp(kelvin).await;
        self.finish(&controller, result).await
    }

    async fn require(&self, key: &str) -> Result<Arc<LampController>> {
        self.get(key)
            .await
            .ok_or_else(|| LampError::UnknownLamp(key.to_string()))
    }

    /// Save the lamp's state after an operation.
    ///
    /// A failed operation may still have changed the assumed state (a toggle
    /// went out before an adjustment failed), so the state is saved either way.
    /// The operation's own error takes precedence over a save error.
    async fn finish(
        &self,
        controller: &LampController,
        result: Result<ReportedState>,
    ) -> Result<ReportedState> {
        let state = controller.reported_state().await;
        let saved = self
            .store
            .save(controller.unique_id(), &LastKnownState::from(state));

        match (result, saved) {
            (Ok(state), Ok(())) => Ok(state),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(save_err)) => {
                warn!(lamp = %controller.name(), error = %save_err, "Failed to save state");
                Err(e)
            }
        }
    }
}
