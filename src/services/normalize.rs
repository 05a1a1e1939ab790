//! Snapshot -> row mapping. No network or disk I/O happens here.

use chrono::{FixedOffset, NaiveDateTime};
use log::warn;

use crate::db::models::{RowShape, ThermostatRecord};
use crate::error::NestlogError;
use crate::snapshot::{DeviceSnapshot, HvacMode, HvacState, Target};
use crate::time::{parse_utc_iso8601, to_local_epoch};
use crate::utils::serde_enum_name;

/// Lookahead margin for an idle heat-cool device, in the device's own scale.
///
/// Not rescaled for Celsius: a Celsius device effectively gets an 18°F margin.
pub const IDLE_LOOKAHEAD_DEGREES: f64 = 10.0;

/// Pick the setpoint a heat-cool device is working toward (or will work toward next).
///
/// An unrecognized `hvac_state` is treated like `off`.
pub fn effective_target(hvac_state: &HvacState, ambient: Option<f64>, low: f64, high: f64) -> f64 {
    match hvac_state {
        HvacState::Heating => low,
        HvacState::Cooling => high,
        HvacState::Off | HvacState::Other(_) => {
            let midpoint = (low + high) / 2.0;
            match ambient {
                Some(t) if t - IDLE_LOOKAHEAD_DEGREES > midpoint => high,
                _ => low,
            }
        }
    }
}

/// Choose the row shape for a snapshot.
pub fn row_shape(snapshot: &DeviceSnapshot) -> RowShape {
    match (&snapshot.mode, snapshot.target) {
        (HvacMode::HeatCool, Target::Range { low, high }) => {
            if let HvacState::Other(raw) = &snapshot.hvac_state {
                warn!(
                    "Thermostat {}: unrecognized hvac_state {:?} in heat-cool mode; using idle heuristic",
                    snapshot.serial, raw
                );
            }
            RowShape::Dual {
                target: effective_target(&snapshot.hvac_state, snapshot.ambient_temperature, low, high),
                low,
                high,
            }
        }
        (HvacMode::HeatCool, Target::Single(target)) => {
            warn!(
                "Thermostat {}: heat-cool mode without a setpoint range; writing single-setpoint row",
                snapshot.serial
            );
            RowShape::Single { target }
        }
        (_, Target::Single(target)) => RowShape::Single { target },
        // a range outside heat-cool mode has no defined single target
        (_, Target::Range { .. }) => RowShape::Single { target: None },
    }
}

/// Build the persisted record for `snapshot` observed at `observed_at` (naive UTC).
pub fn normalize(
    snapshot: &DeviceSnapshot,
    observed_at: NaiveDateTime,
    offset: FixedOffset,
) -> Result<ThermostatRecord, NestlogError> {
    let last_connect = match snapshot.last_connection.as_deref() {
        Some(raw) => Some(to_local_epoch(parse_utc_iso8601(raw)?, offset)),
        None => None,
    };

    Ok(ThermostatRecord {
        datetime: to_local_epoch(observed_at, offset),
        last_connect,
        online: snapshot.online,
        device_serial: snapshot.serial.clone(),
        device_name: snapshot.name.clone(),
        device_where: snapshot.location.clone(),
        label: snapshot.label.clone(),
        mode: snapshot.mode.as_str().to_string(),
        ambient_temperature: snapshot.ambient_temperature,
        temperature_scale: enum_text(&snapshot.temperature_scale),
        humidity: snapshot.humidity,
        device_min_temperature: snapshot.min_temperature,
        device_max_temperature: snapshot.max_temperature,
        hvac_state: snapshot.hvac_state.as_str().to_string(),
        hvac_fan: snapshot.fan,
        hvac_emergency_heat: snapshot.emergency_heat,
        shape: row_shape(snapshot),
        eco_temperature_high: snapshot.eco.high,
        eco_temperature_low: snapshot.eco.low,
        device_is_locked: snapshot.is_locked,
        locked_temperature_low: snapshot.locked.low,
        locked_temperature_high: snapshot.locked.high,
        has_leaf: snapshot.has_leaf,
        device_can_heat: snapshot.can_heat,
        device_can_cool: snapshot.can_cool,
        device_has_humidifier: snapshot.has_humidifier,
        device_has_dehumidifier: snapshot.has_dehumidifier,
        device_has_fan: snapshot.has_fan,
        device_has_hot_water_control: snapshot.has_hot_water_control,
        device_postal_code: snapshot.postal_code.clone(),
    })
}

fn enum_text<T: serde::Serialize>(val: &T) -> String {
    serde_enum_name(val).unwrap_or_default()
}
