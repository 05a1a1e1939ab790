//! Models for the Nest developer API root document (`GET /`).
//!
//! Notes
//! - Every field is optional; the API omits fields the device does not support.
//! - Temperatures come in `_f` and `_c` pairs; the pair member matching
//!   `temperature_scale` is the one a user sees on the device.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::NestlogError;
use crate::snapshot::{Bounds, DeviceSnapshot, HvacMode, HvacState, Structure, Target, TemperatureScale};

// =====================
// Root document
// =====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiRoot {
    #[serde(default)]
    pub devices: Devices,
    #[serde(default)]
    pub structures: BTreeMap<String, ApiStructure>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Devices {
    #[serde(default)]
    pub thermostats: BTreeMap<String, Thermostat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStructure {
    pub structure_id: Option<String>,
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
    pub time_zone: Option<String>,
    pub away: Option<String>,
    #[serde(default)]
    pub thermostats: Vec<String>,
}

// =====================
// Thermostat
// =====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thermostat {
    pub device_id: Option<String>,
    pub structure_id: Option<String>,
    pub name: Option<String>,
    pub name_long: Option<String>,
    pub where_id: Option<String>,
    pub where_name: Option<String>,
    pub label: Option<String>,
    pub software_version: Option<String>,
    pub last_connection: Option<String>,
    pub is_online: Option<bool>,
    pub temperature_scale: Option<TemperatureScale>,
    pub hvac_mode: Option<HvacMode>,
    pub hvac_state: Option<HvacState>,
    pub humidity: Option<i32>,
    pub ambient_temperature_f: Option<f64>,
    pub ambient_temperature_c: Option<f64>,
    pub target_temperature_f: Option<f64>,
    pub target_temperature_c: Option<f64>,
    pub target_temperature_low_f: Option<f64>,
    pub target_temperature_low_c: Option<f64>,
    pub target_temperature_high_f: Option<f64>,
    pub target_temperature_high_c: Option<f64>,
    pub eco_temperature_low_f: Option<f64>,
    pub eco_temperature_low_c: Option<f64>,
    pub eco_temperature_high_f: Option<f64>,
    pub eco_temperature_high_c: Option<f64>,
    pub is_locked: Option<bool>,
    pub locked_temp_min_f: Option<f64>,
    pub locked_temp_min_c: Option<f64>,
    pub locked_temp_max_f: Option<f64>,
    pub locked_temp_max_c: Option<f64>,
    pub is_using_emergency_heat: Option<bool>,
    pub fan_timer_active: Option<bool>,
    pub has_fan: Option<bool>,
    pub has_leaf: Option<bool>,
    pub can_heat: Option<bool>,
    pub can_cool: Option<bool>,
    pub has_humidifier: Option<bool>,
    pub has_dehumidifier: Option<bool>,
    pub has_hot_water_control: Option<bool>,
}

// Supported range of an unlocked device, per scale.
const UNLOCKED_RANGE_C: (f64, f64) = (9.0, 32.0);
const UNLOCKED_RANGE_F: (f64, f64) = (48.0, 90.0);

fn by_scale(scale: TemperatureScale, f: Option<f64>, c: Option<f64>) -> Option<f64> {
    match scale {
        TemperatureScale::F => f,
        TemperatureScale::C => c,
    }
}

impl Thermostat {
    /// Flatten into a snapshot; `postal_code` comes from the owning structure.
    pub fn to_snapshot(&self, postal_code: Option<&str>) -> Result<DeviceSnapshot, NestlogError> {
        let serial = self
            .device_id
            .clone()
            .ok_or_else(|| NestlogError::Api("thermostat without device_id".to_string()))?;
        let scale = self
            .temperature_scale
            .ok_or_else(|| NestlogError::Api(format!("thermostat {} missing temperature_scale", serial)))?;
        let mode = self
            .hvac_mode
            .clone()
            .ok_or_else(|| NestlogError::Api(format!("thermostat {} missing hvac_mode", serial)))?;
        let hvac_state = self
            .hvac_state
            .clone()
            .ok_or_else(|| NestlogError::Api(format!("thermostat {} missing hvac_state", serial)))?;

        let low = by_scale(scale, self.target_temperature_low_f, self.target_temperature_low_c);
        let high = by_scale(scale, self.target_temperature_high_f, self.target_temperature_high_c);
        let target = match (&mode, low, high) {
            (HvacMode::HeatCool, Some(low), Some(high)) => Target::Range { low, high },
            _ => Target::Single(by_scale(scale, self.target_temperature_f, self.target_temperature_c)),
        };

        let locked = Bounds {
            low: by_scale(scale, self.locked_temp_min_f, self.locked_temp_min_c),
            high: by_scale(scale, self.locked_temp_max_f, self.locked_temp_max_c),
        };
        let (min_temperature, max_temperature) = if self.is_locked == Some(true) {
            (locked.low, locked.high)
        } else {
            let (lo, hi) = match scale {
                TemperatureScale::C => UNLOCKED_RANGE_C,
                TemperatureScale::F => UNLOCKED_RANGE_F,
            };
            (Some(lo), Some(hi))
        };

        Ok(DeviceSnapshot {
            serial,
            name: self.name.clone(),
            location: self.where_name.clone(),
            label: self.label.clone(),
            mode,
            ambient_temperature: by_scale(scale, self.ambient_temperature_f, self.ambient_temperature_c),
            temperature_scale: scale,
            humidity: self.humidity,
            min_temperature,
            max_temperature,
            hvac_state,
            fan: self.fan_timer_active,
            emergency_heat: self.is_using_emergency_heat,
            target,
            eco: Bounds {
                low: by_scale(scale, self.eco_temperature_low_f, self.eco_temperature_low_c),
                high: by_scale(scale, self.eco_temperature_high_f, self.eco_temperature_high_c),
            },
            is_locked: self.is_locked,
            locked,
            has_leaf: self.has_leaf,
            can_heat: self.can_heat,
            can_cool: self.can_cool,
            has_humidifier: self.has_humidifier,
            has_dehumidifier: self.has_dehumidifier,
            has_fan: self.has_fan,
            has_hot_water_control: self.has_hot_water_control,
            postal_code: postal_code.map(str::to_string),
            online: self.is_online,
            last_connection: self.last_connection.clone(),
        })
    }
}

impl ApiRoot {
    /// Resolve each structure's thermostat ids against `devices.thermostats`.
    ///
    /// Ids listed by a structure but absent from the device map are skipped; the
    /// API only returns devices the token has access to.
    pub fn into_structures(self) -> Result<Vec<Structure>, NestlogError> {
        let mut out = Vec::with_capacity(self.structures.len());
        for (key, s) in &self.structures {
            let mut thermostats = Vec::with_capacity(s.thermostats.len());
            for id in &s.thermostats {
                if let Some(t) = self.devices.thermostats.get(id) {
                    thermostats.push(t.to_snapshot(s.postal_code.as_deref())?);
                }
            }
            out.push(Structure {
                id: s.structure_id.clone().unwrap_or_else(|| key.clone()),
                name: s.name.clone(),
                thermostats,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture() -> ApiRoot {
        let json = std::fs::read_to_string("tests/data/nest-api.json").expect("fixture present");
        serde_json::from_str(&json).expect("parse api root")
    }

    #[test]
    fn resolves_structures_and_thermostats() {
        let structures = load_fixture().into_structures().unwrap();
        assert_eq!(structures.len(), 1);
        let home = &structures[0];
        assert_eq!(home.name.as_deref(), Some("Home"));
        assert_eq!(home.thermostats.len(), 2);
        assert!(home.thermostats.iter().all(|t| t.postal_code.as_deref() == Some("94304")));
    }

    #[test]
    fn heat_cool_thermostat_reports_range_in_its_scale() {
        let structures = load_fixture().into_structures().unwrap();
        let t = structures[0]
            .thermostats
            .iter()
            .find(|t| t.serial == "peyiJNo0IldT2YlIVtYaGQ")
            .expect("fahrenheit thermostat present");
        assert_eq!(t.mode, HvacMode::HeatCool);
        assert_eq!(t.temperature_scale, TemperatureScale::F);
        assert_eq!(t.target, Target::Range { low: 68.0, high: 74.0 });
        assert_eq!(t.ambient_temperature, Some(71.0));
        assert_eq!((t.min_temperature, t.max_temperature), (Some(48.0), Some(90.0)));
        assert_eq!(t.fan, Some(false));
        assert_eq!(t.last_connection.as_deref(), Some("2017-02-02T21:00:06.000Z"));
    }

    #[test]
    fn celsius_thermostat_uses_c_fields_and_locked_range() {
        let structures = load_fixture().into_structures().unwrap();
        let t = structures[0]
            .thermostats
            .iter()
            .find(|t| t.serial == "a7sA8Gk_0uTwTTo0ZxyJKw")
            .expect("celsius thermostat present");
        assert_eq!(t.mode, HvacMode::Heat);
        assert_eq!(t.hvac_state, HvacState::Off);
        assert_eq!(t.target, Target::Single(Some(21.5)));
        assert_eq!(t.ambient_temperature, Some(20.5));
        assert_eq!(t.is_locked, Some(true));
        assert_eq!((t.min_temperature, t.max_temperature), (Some(19.0), Some(23.0)));
    }

    #[test]
    fn unrecognized_enum_values_are_kept_verbatim() {
        let t: Thermostat = serde_json::from_str(
            r#"{"device_id":"x","temperature_scale":"C","hvac_mode":"auto","hvac_state":"fan-only"}"#,
        )
        .unwrap();
        let s = t.to_snapshot(None).unwrap();
        assert_eq!(s.mode, HvacMode::Other("auto".into()));
        assert_eq!(s.hvac_state, HvacState::Other("fan-only".into()));
        assert_eq!(s.mode.as_str(), "auto");
        assert_eq!(s.hvac_state.as_str(), "fan-only");
    }

    #[test]
    fn missing_device_id_is_an_api_error() {
        let t = Thermostat::default();
        assert!(matches!(t.to_snapshot(None), Err(NestlogError::Api(_))));
    }
}
