use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Double, Integer, Nullable, Text};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::path::Path;

use crate::db::connection::establish;
use crate::db::models::{RowShape, ThermostatRecord, ThermostatRow};
use crate::error::NestlogError;
use crate::utils::quote_ident;

/// Columns written for every row, in bind order. Target columns follow,
/// as given by `RowShape::target_columns`.
const COMMON_COLUMNS: [&str; 29] = [
    "datetime",
    "last_connect",
    "online",
    "device_serial",
    "device_name",
    "device_where",
    "label",
    "mode",
    "ambient_temperature",
    "temperature_scale",
    "humidity",
    "device_min_temperature",
    "device_max_temperature",
    "hvac_state",
    "hvac_fan",
    "hvac_emergency_heat",
    "eco_temperature_high",
    "eco_temperature_low",
    "device_is_locked",
    "locked_temperature_low",
    "locked_temperature_high",
    "has_leaf",
    "device_can_heat",
    "device_can_cool",
    "device_has_humidifier",
    "device_has_dehumidifier",
    "device_has_fan",
    "device_has_hot_water_control",
    "device_postal_code",
];

fn insert_sql(table: &str, shape: &RowShape) -> String {
    let columns = COMMON_COLUMNS
        .iter()
        .chain(shape.target_columns())
        .copied()
        .collect::<Vec<_>>();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!("INSERT INTO {} ({}) VALUES ({})", quote_ident(table), columns.join(", "), placeholders)
}

/// Open a connection, insert one row, close. SQLite autocommits the statement.
pub fn insert_record(path: &Path, table: &str, record: &ThermostatRecord) -> Result<(), NestlogError> {
    let mut conn = establish(path)?;
    insert(&mut conn, table, record)
}

pub fn insert(conn: &mut SqliteConnection, table: &str, r: &ThermostatRecord) -> Result<(), NestlogError> {
    let query = diesel::sql_query(insert_sql(table, &r.shape))
        .into_boxed::<Sqlite>()
        .bind::<BigInt, _>(r.datetime)
        .bind::<Nullable<BigInt>, _>(r.last_connect)
        .bind::<Nullable<Bool>, _>(r.online)
        .bind::<Text, _>(r.device_serial.as_str())
        .bind::<Nullable<Text>, _>(r.device_name.as_deref())
        .bind::<Nullable<Text>, _>(r.device_where.as_deref())
        .bind::<Nullable<Text>, _>(r.label.as_deref())
        .bind::<Text, _>(r.mode.as_str())
        .bind::<Nullable<Double>, _>(r.ambient_temperature)
        .bind::<Text, _>(r.temperature_scale.as_str())
        .bind::<Nullable<Integer>, _>(r.humidity)
        .bind::<Nullable<Double>, _>(r.device_min_temperature)
        .bind::<Nullable<Double>, _>(r.device_max_temperature)
        .bind::<Text, _>(r.hvac_state.as_str())
        .bind::<Nullable<Bool>, _>(r.hvac_fan)
        .bind::<Nullable<Bool>, _>(r.hvac_emergency_heat)
        .bind::<Nullable<Double>, _>(r.eco_temperature_high)
        .bind::<Nullable<Double>, _>(r.eco_temperature_low)
        .bind::<Nullable<Bool>, _>(r.device_is_locked)
        .bind::<Nullable<Double>, _>(r.locked_temperature_low)
        .bind::<Nullable<Double>, _>(r.locked_temperature_high)
        .bind::<Nullable<Bool>, _>(r.has_leaf)
        .bind::<Nullable<Bool>, _>(r.device_can_heat)
        .bind::<Nullable<Bool>, _>(r.device_can_cool)
        .bind::<Nullable<Bool>, _>(r.device_has_humidifier)
        .bind::<Nullable<Bool>, _>(r.device_has_dehumidifier)
        .bind::<Nullable<Bool>, _>(r.device_has_fan)
        .bind::<Nullable<Bool>, _>(r.device_has_hot_water_control)
        .bind::<Nullable<Text>, _>(r.device_postal_code.as_deref());

    let query = match r.shape {
        RowShape::Single { target } => query.bind::<Nullable<Double>, _>(target),
        RowShape::Dual { target, low, high } => query
            .bind::<Double, _>(target)
            .bind::<Double, _>(low)
            .bind::<Double, _>(high),
    };

    query
        .execute(conn)
        .map_err(|e| NestlogError::Storage(format!("insert into {} failed: {}", table, e)))?;
    Ok(())
}

/// All rows in insertion order.
pub fn read_records(conn: &mut SqliteConnection, table: &str) -> Result<Vec<ThermostatRow>, NestlogError> {
    let rows = diesel::sql_query(format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table)))
        .load::<ThermostatRow>(conn)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalize::normalize;
    use crate::services::schema_manager::tests::provisioned;
    use crate::snapshot::fixtures::{heat_cool_snapshot, heating_snapshot};
    use crate::snapshot::HvacState;
    use chrono::{FixedOffset, NaiveDate};

    fn record_for(snapshot: &crate::snapshot::DeviceSnapshot) -> ThermostatRecord {
        let observed = NaiveDate::from_ymd_opt(2017, 2, 2).unwrap().and_hms_opt(21, 5, 0).unwrap();
        normalize(snapshot, observed, FixedOffset::west_opt(8 * 3600).unwrap()).unwrap()
    }

    /// What a record should look like once read back.
    fn expected_row(r: &ThermostatRecord) -> ThermostatRow {
        let (lo, hi) = match r.shape {
            RowShape::Single { .. } => (None, None),
            RowShape::Dual { low, high, .. } => (Some(low), Some(high)),
        };
        ThermostatRow {
            datetime: r.datetime,
            last_connect: r.last_connect,
            online: r.online,
            device_serial: r.device_serial.clone(),
            device_name: r.device_name.clone(),
            device_where: r.device_where.clone(),
            label: r.label.clone(),
            mode: r.mode.clone(),
            ambient_temperature: r.ambient_temperature,
            temperature_scale: r.temperature_scale.clone(),
            humidity: r.humidity,
            device_min_temperature: r.device_min_temperature,
            device_max_temperature: r.device_max_temperature,
            hvac_state: r.hvac_state.clone(),
            hvac_fan: r.hvac_fan,
            hvac_emergency_heat: r.hvac_emergency_heat,
            target_temperature: r.shape.target_temperature(),
            target_lo_temperature: lo,
            target_hi_temperature: hi,
            eco_temperature_high: r.eco_temperature_high,
            eco_temperature_low: r.eco_temperature_low,
            device_is_locked: r.device_is_locked,
            locked_temperature_low: r.locked_temperature_low,
            locked_temperature_high: r.locked_temperature_high,
            has_leaf: r.has_leaf,
            device_can_heat: r.device_can_heat,
            device_can_cool: r.device_can_cool,
            device_has_humidifier: r.device_has_humidifier,
            device_has_dehumidifier: r.device_has_dehumidifier,
            device_has_fan: r.device_has_fan,
            device_has_hot_water_control: r.device_has_hot_water_control,
            device_postal_code: r.device_postal_code.clone(),
        }
    }

    #[test]
    fn insert_sql_lists_shape_columns() {
        let single = insert_sql("thermostat", &RowShape::Single { target: Some(70.0) });
        assert!(single.starts_with("INSERT INTO \"thermostat\" (datetime, last_connect,"));
        assert!(single.contains("device_postal_code, target_temperature) VALUES"));
        assert_eq!(single.matches('?').count(), 30);

        let dual = insert_sql(
            "thermostat",
            &RowShape::Dual {
                target: 68.0,
                low: 68.0,
                high: 74.0,
            },
        );
        assert!(dual.contains("target_temperature, target_lo_temperature, target_hi_temperature)"));
        assert_eq!(dual.matches('?').count(), 32);
    }

    #[test]
    fn records_round_trip_in_insert_order() {
        let (_dir, cfg) = provisioned();
        let single = record_for(&heating_snapshot());
        let dual = record_for(&heat_cool_snapshot(HvacState::Off, 85.0, 68.0, 74.0));
        let mut celsius_snapshot = heating_snapshot();
        celsius_snapshot.serial = "celsius".into();
        celsius_snapshot.temperature_scale = crate::snapshot::TemperatureScale::C;
        celsius_snapshot.ambient_temperature = Some(20.5);
        celsius_snapshot.target = crate::snapshot::Target::Single(Some(21.5));
        celsius_snapshot.has_leaf = None;
        let celsius = record_for(&celsius_snapshot);

        for r in [&single, &dual, &celsius] {
            insert_record(&cfg.database_path, &cfg.table_name, r).unwrap();
        }

        let mut conn = establish(&cfg.database_path).unwrap();
        let rows = read_records(&mut conn, &cfg.table_name).unwrap();
        assert_eq!(rows, vec![expected_row(&single), expected_row(&dual), expected_row(&celsius)]);
    }

    #[test]
    fn single_shape_leaves_range_columns_null() {
        let (_dir, cfg) = provisioned();
        insert_record(&cfg.database_path, &cfg.table_name, &record_for(&heating_snapshot())).unwrap();

        let mut conn = establish(&cfg.database_path).unwrap();
        let row = read_records(&mut conn, &cfg.table_name).unwrap().remove(0);
        assert_eq!(row.target_temperature, Some(70.0));
        assert_eq!(row.target_lo_temperature, None);
        assert_eq!(row.target_hi_temperature, None);
    }

    #[test]
    fn dual_shape_writes_effective_target_and_range() {
        let (_dir, cfg) = provisioned();
        let record = record_for(&heat_cool_snapshot(HvacState::Off, 60.0, 68.0, 74.0));
        insert_record(&cfg.database_path, &cfg.table_name, &record).unwrap();

        let mut conn = establish(&cfg.database_path).unwrap();
        let row = read_records(&mut conn, &cfg.table_name).unwrap().remove(0);
        assert_eq!(row.mode, "heat-cool");
        assert_eq!(row.target_temperature, Some(68.0));
        assert_eq!(row.target_lo_temperature, Some(68.0));
        assert_eq!(row.target_hi_temperature, Some(74.0));
    }

    #[test]
    fn unrecognized_mode_is_stored_verbatim() {
        let (_dir, cfg) = provisioned();
        let snapshot = crate::snapshot::DeviceSnapshot {
            mode: crate::snapshot::HvacMode::Other("auto".into()),
            hvac_state: HvacState::Other("fan-only".into()),
            ..heating_snapshot()
        };
        insert_record(&cfg.database_path, &cfg.table_name, &record_for(&snapshot)).unwrap();

        let mut conn = establish(&cfg.database_path).unwrap();
        let row = read_records(&mut conn, &cfg.table_name).unwrap().remove(0);
        assert_eq!(row.mode, "auto");
        assert_eq!(row.hvac_state, "fan-only");
    }

    #[test]
    fn insert_without_table_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = insert_record(&dir.path().join("empty.sdb"), "thermostat", &record_for(&heating_snapshot()))
            .unwrap_err();
        assert!(matches!(err, NestlogError::Storage(_)));
    }
}
