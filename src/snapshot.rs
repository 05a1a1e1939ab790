//! Per-poll view of a single thermostat, independent of the vendor's JSON layout.

use serde::{Deserialize, Serialize};

/// Thermostat operating mode. Values the vendor adds later are kept verbatim in
/// `Other` so they reach storage unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HvacMode {
    Heat,
    Cool,
    HeatCool,
    Eco,
    Off,
    Other(String),
}

impl HvacMode {
    pub fn as_str(&self) -> &str {
        match self {
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat-cool",
            HvacMode::Eco => "eco",
            HvacMode::Off => "off",
            HvacMode::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for HvacMode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "heat" => HvacMode::Heat,
            "cool" => HvacMode::Cool,
            "heat-cool" => HvacMode::HeatCool,
            "eco" => HvacMode::Eco,
            "off" => HvacMode::Off,
            _ => HvacMode::Other(raw),
        }
    }
}

impl From<HvacMode> for String {
    fn from(mode: HvacMode) -> Self {
        match mode {
            HvacMode::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// What the HVAC equipment is doing right now; unrecognized values land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HvacState {
    Heating,
    Cooling,
    Off,
    Other(String),
}

impl HvacState {
    pub fn as_str(&self) -> &str {
        match self {
            HvacState::Heating => "heating",
            HvacState::Cooling => "cooling",
            HvacState::Off => "off",
            HvacState::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for HvacState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "heating" => HvacState::Heating,
            "cooling" => HvacState::Cooling,
            "off" => HvacState::Off,
            _ => HvacState::Other(raw),
        }
    }
}

impl From<HvacState> for String {
    fn from(state: HvacState) -> Self {
        match state {
            HvacState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureScale {
    C,
    F,
}

/// Setpoint(s) as reported for the current mode.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Target {
    Single(Option<f64>),
    Range { low: f64, high: f64 },
}

/// Low/high pair used for eco and locked ranges.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Bounds {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub serial: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub label: Option<String>,
    pub mode: HvacMode,
    pub ambient_temperature: Option<f64>,
    pub temperature_scale: TemperatureScale,
    pub humidity: Option<i32>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub hvac_state: HvacState,
    pub fan: Option<bool>,
    pub emergency_heat: Option<bool>,
    pub target: Target,
    pub eco: Bounds,
    pub is_locked: Option<bool>,
    pub locked: Bounds,
    pub has_leaf: Option<bool>,
    pub can_heat: Option<bool>,
    pub can_cool: Option<bool>,
    pub has_humidifier: Option<bool>,
    pub has_dehumidifier: Option<bool>,
    pub has_fan: Option<bool>,
    pub has_hot_water_control: Option<bool>,
    pub postal_code: Option<String>,
    pub online: Option<bool>,
    /// Raw vendor value, ISO-8601 UTC with a literal `Z`.
    pub last_connection: Option<String>,
}

/// A site grouping one or more thermostats.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub id: String,
    pub name: Option<String>,
    pub thermostats: Vec<DeviceSnapshot>,
}
