//! Row types for the `thermostat` table and the SQLite catalog.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};

use crate::db::schema::thermostat;

/// Which target columns a row carries.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RowShape {
    /// `target_temperature` only; lo/hi stay NULL.
    Single { target: Option<f64> },
    /// Heat-cool mode: the effective target plus both setpoints.
    Dual { target: f64, low: f64, high: f64 },
}

impl RowShape {
    pub fn target_columns(&self) -> &'static [&'static str] {
        match self {
            RowShape::Single { .. } => &["target_temperature"],
            RowShape::Dual { .. } => &["target_temperature", "target_lo_temperature", "target_hi_temperature"],
        }
    }

    pub fn target_temperature(&self) -> Option<f64> {
        match *self {
            RowShape::Single { target } => target,
            RowShape::Dual { target, .. } => Some(target),
        }
    }
}

/// One poll of one device, ready to insert. Never mutated once written.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatRecord {
    /// Observation time, local-adjusted epoch seconds.
    pub datetime: i64,
    /// Device's last cloud connection, local-adjusted epoch seconds.
    pub last_connect: Option<i64>,
    pub online: Option<bool>,
    pub device_serial: String,
    pub device_name: Option<String>,
    pub device_where: Option<String>,
    pub label: Option<String>,
    pub mode: String,
    pub ambient_temperature: Option<f64>,
    pub temperature_scale: String,
    pub humidity: Option<i32>,
    pub device_min_temperature: Option<f64>,
    pub device_max_temperature: Option<f64>,
    pub hvac_state: String,
    pub hvac_fan: Option<bool>,
    pub hvac_emergency_heat: Option<bool>,
    pub shape: RowShape,
    pub eco_temperature_high: Option<f64>,
    pub eco_temperature_low: Option<f64>,
    pub device_is_locked: Option<bool>,
    pub locked_temperature_low: Option<f64>,
    pub locked_temperature_high: Option<f64>,
    pub has_leaf: Option<bool>,
    pub device_can_heat: Option<bool>,
    pub device_can_cool: Option<bool>,
    pub device_has_humidifier: Option<bool>,
    pub device_has_dehumidifier: Option<bool>,
    pub device_has_fan: Option<bool>,
    pub device_has_hot_water_control: Option<bool>,
    pub device_postal_code: Option<String>,
}

/// A stored row as read back; booleans come back through SQLite's TEXT affinity.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
#[diesel(table_name = thermostat)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ThermostatRow {
    pub datetime: i64,
    pub last_connect: Option<i64>,
    pub online: Option<bool>,
    pub device_serial: String,
    pub device_name: Option<String>,
    pub device_where: Option<String>,
    pub label: Option<String>,
    pub mode: String,
    pub ambient_temperature: Option<f64>,
    pub temperature_scale: String,
    pub humidity: Option<i32>,
    pub device_min_temperature: Option<f64>,
    pub device_max_temperature: Option<f64>,
    pub hvac_state: String,
    pub hvac_fan: Option<bool>,
    pub hvac_emergency_heat: Option<bool>,
    pub target_temperature: Option<f64>,
    pub target_lo_temperature: Option<f64>,
    pub target_hi_temperature: Option<f64>,
    pub eco_temperature_high: Option<f64>,
    pub eco_temperature_low: Option<f64>,
    pub device_is_locked: Option<bool>,
    pub locked_temperature_low: Option<f64>,
    pub locked_temperature_high: Option<f64>,
    pub has_leaf: Option<bool>,
    pub device_can_heat: Option<bool>,
    pub device_can_cool: Option<bool>,
    pub device_has_humidifier: Option<bool>,
    pub device_has_dehumidifier: Option<bool>,
    pub device_has_fan: Option<bool>,
    pub device_has_hot_water_control: Option<bool>,
    pub device_postal_code: Option<String>,
}

/// One entry of `sqlite_master`.
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName)]
pub struct SchemaObject {
    #[diesel(sql_type = Text)]
    pub object_type: String,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub table_name: String,
    #[diesel(sql_type = Integer)]
    pub root_page: i32,
    /// NULL for automatic indices.
    #[diesel(sql_type = Nullable<Text>)]
    pub sql: Option<String>,
}

#[derive(Debug, QueryableByName)]
pub(crate) struct Count {
    #[diesel(sql_type = BigInt)]
    pub n: i64,
}

#[derive(Debug, QueryableByName)]
pub(crate) struct ColumnName {
    #[diesel(sql_type = Text)]
    pub name: String,
}
