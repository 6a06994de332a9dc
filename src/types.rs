use std::fmt;

use serde::Serialize;

pub const DEFAULT_NAME: &str = "POER Thermostat";
pub const DEFAULT_MODEL: &str = "Unknown Model";
pub const DEFAULT_FIRMWARE: &str = "Unknown";
pub const DEFAULT_MIN_TEMP_C: f64 = 7.0;
pub const DEFAULT_MAX_TEMP_C: f64 = 35.0;
pub const TEMP_STEP_C: f64 = 0.5;

/// Temperature stored as Celsius.
/// POER devices accept setpoints in 0.5 degree increments.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Temperature(f64);

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    /// Round to the device step (0.5 increments).
    pub fn to_half_degree(&self) -> Self {
        self.round_to_step(TEMP_STEP_C)
    }

    /// Round to a multiple of `step`. A non-positive step leaves the value as is.
    pub fn round_to_step(&self, step: f64) -> Self {
        if step > 0.0 {
            Self((self.0 / step).round() * step)
        } else {
            *self
        }
    }

    /// Never panics: with inverted bounds `max` wins.
    pub fn clamp(&self, min: Temperature, max: Temperature) -> Self {
        Self(self.0.max(min.0).min(max.0))
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Auto,
    Heat,
    Cool,
    #[default]
    Off,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Auto => "auto",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::Off => "off",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(HvacMode::Auto),
            "heat" => Some(HvacMode::Heat),
            "cool" => Some(HvacMode::Cool),
            "off" => Some(HvacMode::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacAction {
    Heating,
    Cooling,
    #[default]
    Idle,
}

impl HvacAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
            HvacAction::Idle => "idle",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "heating" => Some(HvacAction::Heating),
            "cooling" => Some(HvacAction::Cooling),
            "idle" => Some(HvacAction::Idle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    None,
    Home,
    Away,
    Sleep,
    Eco,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::Home => "home",
            Preset::Away => "away",
            Preset::Sleep => "sleep",
            Preset::Eco => "eco",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Preset::None),
            "home" => Some(Preset::Home),
            "away" => Some(Preset::Away),
            "sleep" => Some(Preset::Sleep),
            "eco" => Some(Preset::Eco),
            _ => None,
        }
    }
}

/// What a vendor variant accepts from the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub hvac_modes: Vec<HvacMode>,
    pub presets: Vec<Preset>,
    pub temp_step: f64,
    /// Accepts a low/high setpoint pair.
    pub temp_range: bool,
    /// The vendor has no preset field: away is a mode, so a mode change
    /// also resets the preset.
    pub mode_encodes_preset: bool,
}

impl Capabilities {
    pub fn supports_mode(&self, mode: HvacMode) -> bool {
        self.hvac_modes.contains(&mode)
    }

    pub fn supports_preset(&self, preset: Preset) -> bool {
        self.presets.contains(&preset)
    }
}

/// Base device fields from the device list.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub device_id: String,
    pub name: String,
    pub model: String,
    pub firmware: String,
    pub min_temp: Temperature,
    pub max_temp: Temperature,
}

/// Per-device status, already translated to host vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceStatus {
    pub current_temp: Option<Temperature>,
    pub current_humidity: Option<f64>,
    pub target_temp: Option<Temperature>,
    pub temp_low: Option<Temperature>,
    pub temp_high: Option<Temperature>,
    pub mode: HvacMode,
    pub action: HvacAction,
    pub preset: Preset,
    /// Mode string exactly as the vendor reported it.
    pub vendor_mode: Option<String>,
}

/// One thermostat as seen by the host. Rebuilt from scratch every poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub name: String,
    pub model: String,
    pub firmware: String,
    pub current_temp: Option<Temperature>,
    pub current_humidity: Option<f64>,
    pub target_temp: Option<Temperature>,
    pub temp_low: Option<Temperature>,
    pub temp_high: Option<Temperature>,
    pub min_temp: Temperature,
    pub max_temp: Temperature,
    pub mode: HvacMode,
    pub action: HvacAction,
    pub preset: Preset,
    pub vendor_mode: Option<String>,
    pub status_available: bool,
}

impl DeviceRecord {
    /// Merge status over the base device fields. `None` keeps the base
    /// fields only and marks the status as unavailable.
    pub fn merge(info: DeviceInfo, status: Option<DeviceStatus>) -> Self {
        let status_available = status.is_some();
        let status = status.unwrap_or_default();
        Self {
            device_id: info.device_id,
            name: info.name,
            model: info.model,
            firmware: info.firmware,
            current_temp: status.current_temp,
            current_humidity: status.current_humidity,
            target_temp: status.target_temp,
            temp_low: status.temp_low,
            temp_high: status.temp_high,
            min_temp: info.min_temp,
            max_temp: info.max_temp,
            mode: status.mode,
            action: status.action,
            preset: status.preset,
            vendor_mode: status.vendor_mode,
            status_available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    SetTemperature(Temperature),
    SetTemperatureRange { low: Temperature, high: Temperature },
    SetHvacMode(HvacMode),
    SetPreset(Preset),
}

/// A single outbound request, built fresh per call.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub device_id: String,
    pub kind: CommandKind,
    /// Host mode in effect when the command was issued.
    pub current_mode: HvacMode,
}

impl Command {
    pub fn action_name(&self) -> &'static str {
        match self.kind {
            CommandKind::SetTemperature(_) => "set_temperature",
            CommandKind::SetTemperatureRange { .. } => "set_temperature_range",
            CommandKind::SetHvacMode(_) => "set_hvac_mode",
            CommandKind::SetPreset(_) => "set_preset_mode",
        }
    }
}
