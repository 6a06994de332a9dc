use tracing::{debug, error, warn};

use crate::client::Shared;
use crate::poller::Poller;
use crate::types::*;
use crate::{Error, Result};

/// Validate, apply optimistically, send, revert on failure.
///
/// There is no queue: concurrent commands and polls race and the last
/// write to the store wins.
pub(crate) struct Dispatcher<'a> {
    shared: &'a Shared,
}

impl<'a> Dispatcher<'a> {
    pub fn new(shared: &'a Shared) -> Self {
        Self { shared }
    }

    pub async fn set_temperature(&self, device_id: &str, temp: Temperature) -> bool {
        if !temp.is_finite() {
            return reject(device_id, Error::InvalidTemperature(temp.celsius().to_string()));
        }
        let record = match self.current(device_id) {
            Ok(record) => record,
            Err(e) => return reject(device_id, e),
        };
        let target = self.fit(temp, &record);
        if target != temp {
            debug!(device = device_id, requested = %temp, target = %target, "adjusted setpoint");
        }
        let command = Command {
            device_id: device_id.to_string(),
            kind: CommandKind::SetTemperature(target),
            current_mode: record.mode,
        };
        self.dispatch(command, |r| r.target_temp = Some(target)).await
    }

    pub async fn set_temperature_range(
        &self,
        device_id: &str,
        low: Temperature,
        high: Temperature,
    ) -> bool {
        if !self.shared.vendor.capabilities().temp_range {
            return reject(device_id, Error::UnsupportedCommand("set_temperature_range"));
        }
        if !low.is_finite() || !high.is_finite() {
            return reject(device_id, Error::InvalidTemperature(format!("{low} .. {high}")));
        }
        let record = match self.current(device_id) {
            Ok(record) => record,
            Err(e) => return reject(device_id, e),
        };
        let (low, high) = (self.fit(low, &record), self.fit(high, &record));
        if low > high {
            return reject(device_id, Error::InvalidTemperature(format!("{low} > {high}")));
        }
        let command = Command {
            device_id: device_id.to_string(),
            kind: CommandKind::SetTemperatureRange { low, high },
            current_mode: record.mode,
        };
        self.dispatch(command, |r| {
            r.temp_low = Some(low);
            r.temp_high = Some(high);
        })
        .await
    }

    pub async fn set_hvac_mode(&self, device_id: &str, mode: HvacMode) -> bool {
        let caps = self.shared.vendor.capabilities();
        if !caps.supports_mode(mode) {
            return reject(device_id, Error::UnsupportedMode(mode.as_str().to_string()));
        }
        let record = match self.current(device_id) {
            Ok(record) => record,
            Err(e) => return reject(device_id, e),
        };
        let command = Command {
            device_id: device_id.to_string(),
            kind: CommandKind::SetHvacMode(mode),
            current_mode: record.mode,
        };
        self.dispatch(command, |r| {
            r.mode = mode;
            if caps.mode_encodes_preset {
                r.preset = Preset::Home;
            }
        })
        .await
    }

    pub async fn set_preset_mode(&self, device_id: &str, preset: Preset) -> bool {
        let caps = self.shared.vendor.capabilities();
        if !caps.supports_preset(preset) {
            return reject(device_id, Error::UnsupportedPreset(preset.as_str().to_string()));
        }
        let record = match self.current(device_id) {
            Ok(record) => record,
            Err(e) => return reject(device_id, e),
        };
        let command = Command {
            device_id: device_id.to_string(),
            kind: CommandKind::SetPreset(preset),
            current_mode: record.mode,
        };
        self.dispatch(command, |r| {
            r.preset = preset;
            // eco is reported back as heat + away
            if caps.mode_encodes_preset && preset == Preset::Away {
                r.mode = HvacMode::Heat;
            }
        })
        .await
    }

    /// Round to the vendor step, then clamp to the device range.
    fn fit(&self, temp: Temperature, record: &DeviceRecord) -> Temperature {
        let step = self.shared.vendor.capabilities().temp_step;
        temp.round_to_step(step).clamp(record.min_temp, record.max_temp)
    }

    fn current(&self, device_id: &str) -> Result<DeviceRecord> {
        self.shared
            .store
            .read()
            .find(device_id)
            .cloned()
            .ok_or_else(|| Error::UnknownDevice(device_id.to_string()))
    }

    async fn dispatch(&self, command: Command, apply: impl FnOnce(&mut DeviceRecord)) -> bool {
        let applied = self.shared.store.write().apply(&command.device_id, apply);
        if !applied {
            warn!(device = %command.device_id, "device disappeared before command");
            return false;
        }
        self.shared.publish();

        let result = self.shared.vendor.send_command(&command).await;
        self.shared.log_command(&command, result.is_ok());

        match result {
            Ok(()) => {
                debug!(
                    device = %command.device_id,
                    action = command.action_name(),
                    "command accepted"
                );
                if self.shared.refresh_after_command
                    && let Err(e) = Poller::new(self.shared).poll().await
                {
                    debug!(device = %command.device_id, error = %e, "refresh after command failed");
                }
                true
            }
            Err(e) => {
                error!(
                    device = %command.device_id,
                    action = command.action_name(),
                    error = %e,
                    "command failed, reverting"
                );
                self.shared.store.write().revert(&command.device_id);
                self.shared.publish();
                false
            }
        }
    }
}

fn reject(device_id: &str, err: Error) -> bool {
    error!(device = device_id, error = %err, "command not sent");
    false
}
