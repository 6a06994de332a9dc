use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::translate::{
    intent_action, intent_mode_and_preset, intent_mode_for_preset, intent_mode_out, rest_action,
    rest_mode, rest_mode_out, rest_preset, rest_preset_out,
};
use crate::types::*;
use crate::{Error, Result};

pub const API_PREFIX: &str = "/api/v1";
pub const INTENT_PATH: &str = "/api/v1/smarthome";

pub const INTENT_SYNC: &str = "action.devices.SYNC";
pub const INTENT_QUERY: &str = "action.devices.QUERY";
pub const INTENT_EXECUTE: &str = "action.devices.EXECUTE";

pub const CMD_SET_TEMPERATURE: &str = "action.devices.commands.ThermostatTemperatureSetpoint";
pub const CMD_SET_MODE: &str = "action.devices.commands.ThermostatSetMode";

// -- REST variant --

/// Endpoint suffix and JSON body for a REST command.
pub fn rest_command(kind: CommandKind) -> (&'static str, Value) {
    match kind {
        CommandKind::SetTemperature(t) => ("set_temp", json!({ "temperature": t.celsius() })),
        CommandKind::SetTemperatureRange { low, high } => (
            "set_temp_range",
            json!({ "low": low.celsius(), "high": high.celsius() }),
        ),
        CommandKind::SetHvacMode(mode) => ("set_mode", json!({ "mode": rest_mode_out(mode) })),
        CommandKind::SetPreset(preset) => {
            ("set_preset", json!({ "preset": rest_preset_out(preset) }))
        }
    }
}

pub fn parse_device_list(body: &Value) -> Result<Vec<DeviceInfo>> {
    let devices = body
        .as_array()
        .ok_or_else(|| Error::Protocol("device list is not an array".to_string()))?;
    let min = Temperature::from_celsius(DEFAULT_MIN_TEMP_C);
    let max = Temperature::from_celsius(DEFAULT_MAX_TEMP_C);
    devices.iter().map(|d| parse_device_info(d, min, max)).collect()
}

pub fn parse_rest_status(body: &Value) -> Result<DeviceStatus> {
    if !body.is_object() {
        return Err(Error::Protocol("status is not an object".to_string()));
    }
    let vendor_mode = str_field(body, "mode");
    Ok(DeviceStatus {
        current_temp: temp_field(body, "current_temp"),
        current_humidity: body.get("current_humidity").and_then(|v| v.as_f64()),
        target_temp: temp_field(body, "target_temp"),
        temp_low: temp_field(body, "temp_low"),
        temp_high: temp_field(body, "temp_high"),
        mode: rest_mode(vendor_mode.as_deref().unwrap_or("off")),
        action: rest_action(body.get("action").and_then(|v| v.as_str()).unwrap_or("idle")),
        preset: rest_preset(body.get("preset").and_then(|v| v.as_str()).unwrap_or("none")),
        vendor_mode,
    })
}

// -- Intent variant --

pub fn intent_request(intent: &str, payload: Option<Value>) -> Value {
    let mut input = json!({ "intent": intent });
    if let Some(payload) = payload {
        input["payload"] = payload;
    }
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "inputs": [input]
    })
}

pub fn sync_request() -> Value {
    intent_request(INTENT_SYNC, None)
}

pub fn query_request(device_id: &str) -> Value {
    intent_request(
        INTENT_QUERY,
        Some(json!({ "devices": [{ "id": device_id }] })),
    )
}

pub fn execute_request(device_id: &str, command: &str, params: Value) -> Value {
    intent_request(
        INTENT_EXECUTE,
        Some(json!({
            "commands": [{
                "devices": [{ "id": device_id }],
                "execution": [{
                    "command": command,
                    "params": params
                }]
            }]
        })),
    )
}

/// EXECUTE command name and params. Presets ride on `ThermostatSetMode`.
/// The intent API has no setpoint pair.
pub fn intent_command(cmd: &Command) -> Result<(&'static str, Value)> {
    let command = match cmd.kind {
        CommandKind::SetTemperature(t) => (
            CMD_SET_TEMPERATURE,
            json!({ "thermostatTemperatureSetpoint": t.celsius() }),
        ),
        CommandKind::SetTemperatureRange { .. } => {
            return Err(Error::UnsupportedCommand(cmd.action_name()));
        }
        CommandKind::SetHvacMode(mode) => (
            CMD_SET_MODE,
            json!({ "thermostatMode": intent_mode_out(mode) }),
        ),
        CommandKind::SetPreset(preset) => (
            CMD_SET_MODE,
            json!({ "thermostatMode": intent_mode_for_preset(preset, cmd.current_mode) }),
        ),
    };
    Ok(command)
}

pub fn parse_sync_response(body: &Value) -> Result<Vec<DeviceInfo>> {
    let devices = body
        .pointer("/payload/devices")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::Protocol("SYNC response missing payload.devices".to_string()))?;
    devices
        .iter()
        .map(|d| {
            let (min, max) = sync_range(d);
            parse_device_info(d, min, max)
        })
        .collect()
}

/// Vendor range with defaults for missing bounds. An inverted range falls
/// back to the defaults entirely.
fn sync_range(d: &Value) -> (Temperature, Temperature) {
    let default_min = Temperature::from_celsius(DEFAULT_MIN_TEMP_C);
    let default_max = Temperature::from_celsius(DEFAULT_MAX_TEMP_C);
    let min = temp_field(d, "minTemp").unwrap_or(default_min);
    let max = temp_field(d, "maxTemp").unwrap_or(default_max);
    if min > max {
        warn!(device = %d, min = %min, max = %max, "inverted temperature range, using defaults");
        return (default_min, default_max);
    }
    (min, max)
}

pub fn parse_query_response(body: &Value, device_id: &str) -> Result<DeviceStatus> {
    let devices = body
        .pointer("/payload/devices")
        .and_then(|v| v.as_object())
        .ok_or_else(|| Error::Protocol("QUERY response missing payload.devices".to_string()))?;
    let state = devices
        .get(device_id)
        .ok_or_else(|| Error::Protocol(format!("QUERY response has no entry for {device_id}")))?;
    if state.get("status").and_then(|v| v.as_str()) == Some("ERROR") {
        let code = str_field(state, "errorCode").unwrap_or_else(|| "ERROR".to_string());
        return Err(Error::Rejected(code));
    }

    let vendor_mode = str_field(state, "thermostatMode");
    let (mode, preset) = intent_mode_and_preset(vendor_mode.as_deref().unwrap_or("off"));
    Ok(DeviceStatus {
        current_temp: temp_field(state, "thermostatTemperatureAmbient"),
        current_humidity: state.get("thermostatHumidityAmbient").and_then(|v| v.as_f64()),
        target_temp: temp_field(state, "thermostatTemperatureSetpoint"),
        temp_low: None,
        temp_high: None,
        mode,
        action: intent_action(
            state
                .get("activeThermostatMode")
                .and_then(|v| v.as_str())
                .unwrap_or("none"),
        ),
        preset,
        vendor_mode,
    })
}

pub fn parse_execute_response(body: &Value) -> Result<()> {
    let commands = body
        .pointer("/payload/commands")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::Protocol("EXECUTE response missing payload.commands".to_string()))?;
    for result in commands {
        match result.get("status").and_then(|v| v.as_str()) {
            Some("SUCCESS" | "PENDING") => {}
            Some("ERROR") => {
                let code = str_field(result, "errorCode").unwrap_or_else(|| "ERROR".to_string());
                return Err(Error::Rejected(code));
            }
            other => {
                return Err(Error::Protocol(format!("unexpected command status: {other:?}")));
            }
        }
    }
    Ok(())
}

// -- Shared helpers --

fn parse_device_info(
    d: &Value,
    min_temp: Temperature,
    max_temp: Temperature,
) -> Result<DeviceInfo> {
    let device_id = d
        .get("device_id")
        .or_else(|| d.get("id"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Protocol(format!("device without id: {d}")))?;
    Ok(DeviceInfo {
        device_id: device_id.to_string(),
        name: str_field(d, "name").unwrap_or_else(|| DEFAULT_NAME.to_string()),
        model: str_field(d, "model").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        firmware: str_field(d, "firmware").unwrap_or_else(|| DEFAULT_FIRMWARE.to_string()),
        min_temp,
        max_temp,
    })
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn temp_field(v: &Value, key: &str) -> Option<Temperature> {
    v.get(key).and_then(|v| v.as_f64()).map(Temperature::from_celsius)
}
