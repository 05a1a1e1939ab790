//! Handwritten Diesel declaration of the `thermostat` table.
//!
//! The DDL lives in `services::schema_manager`; this only gives `QueryableByName`
//! the SQL type of each column. The table has no declared key; one reading per
//! device per instant is the natural identity.

diesel::table! {
    thermostat (datetime, device_serial) {
        datetime -> BigInt,
        last_connect -> Nullable<BigInt>,
        online -> Nullable<Bool>,
        device_serial -> Text,
        device_name -> Nullable<Text>,
        device_where -> Nullable<Text>,
        label -> Nullable<Text>,
        mode -> Text,
        ambient_temperature -> Nullable<Double>,
        temperature_scale -> Text,
        humidity -> Nullable<Integer>,
        device_min_temperature -> Nullable<Double>,
        device_max_temperature -> Nullable<Double>,
        hvac_state -> Text,
        hvac_fan -> Nullable<Bool>,
        hvac_emergency_heat -> Nullable<Bool>,
        target_temperature -> Nullable<Double>,
        eco_temperature_high -> Nullable<Double>,
        eco_temperature_low -> Nullable<Double>,
        device_is_locked -> Nullable<Bool>,
        locked_temperature_low -> Nullable<Double>,
        locked_temperature_high -> Nullable<Double>,
        has_leaf -> Nullable<Bool>,
        device_can_heat -> Nullable<Bool>,
        device_can_cool -> Nullable<Bool>,
        device_has_humidifier -> Nullable<Bool>,
        device_has_dehumidifier -> Nullable<Bool>,
        device_has_fan -> Nullable<Bool>,
        device_has_hot_water_control -> Nullable<Bool>,
        device_postal_code -> Nullable<Text>,
        // added by migration; NULL for single-setpoint rows and pre-migration rows
        target_lo_temperature -> Nullable<Double>,
        target_hi_temperature -> Nullable<Double>,
    }
}
