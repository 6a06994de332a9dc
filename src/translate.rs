//! Vendor vocabulary <-> host vocabulary.
//!
//! Every inbound function is total: unknown vendor strings fall back to
//! `off`, `idle` or `none` instead of failing.

use crate::types::{HvacAction, HvacMode, Preset};

// -- REST variant --

pub fn rest_mode(vendor: &str) -> HvacMode {
    match vendor {
        "auto" => HvacMode::Auto,
        "heat" => HvacMode::Heat,
        "cool" => HvacMode::Cool,
        _ => HvacMode::Off,
    }
}

pub fn rest_action(vendor: &str) -> HvacAction {
    match vendor {
        "heating" => HvacAction::Heating,
        "cooling" => HvacAction::Cooling,
        _ => HvacAction::Idle,
    }
}

pub fn rest_preset(vendor: &str) -> Preset {
    match vendor {
        "home" => Preset::Home,
        "away" => Preset::Away,
        "sleep" => Preset::Sleep,
        "eco" => Preset::Eco,
        _ => Preset::None,
    }
}

pub fn rest_mode_out(mode: HvacMode) -> &'static str {
    mode.as_str()
}

pub fn rest_preset_out(preset: Preset) -> &'static str {
    preset.as_str()
}

// -- Intent variant --

pub const INTENT_ECO_MODE: &str = "eco";

/// Cross mapping: the intent API has no preset field, "eco" mode means away.
pub fn intent_mode_and_preset(vendor: &str) -> (HvacMode, Preset) {
    match vendor {
        "auto" => (HvacMode::Auto, Preset::Home),
        "heat" => (HvacMode::Heat, Preset::Home),
        "cool" => (HvacMode::Cool, Preset::Home),
        "off" => (HvacMode::Off, Preset::Home),
        INTENT_ECO_MODE => (HvacMode::Heat, Preset::Away),
        _ => (HvacMode::Off, Preset::Home),
    }
}

pub fn intent_action(vendor: &str) -> HvacAction {
    match vendor {
        "heat" | "heating" => HvacAction::Heating,
        "cool" | "cooling" => HvacAction::Cooling,
        _ => HvacAction::Idle,
    }
}

/// Outbound `thermostatMode` for a preset change. Away always sends eco,
/// whatever mode is requested alongside it.
pub fn intent_mode_for_preset(preset: Preset, mode: HvacMode) -> &'static str {
    match preset {
        Preset::Away => INTENT_ECO_MODE,
        _ => intent_mode_out(mode),
    }
}

pub fn intent_mode_out(mode: HvacMode) -> &'static str {
    mode.as_str()
}
