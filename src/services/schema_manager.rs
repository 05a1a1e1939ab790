//! DDL for the `thermostat` table and its read view.
//!
//! Strict operations inspect the catalog first and fail with `Schema` when the
//! database is not in the expected state; the `*_if_missing` / `*_if_exists`
//! variants turn the same situation into a no-op.

use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::SqliteConnection;
use log::info;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::db::connection::establish;
use crate::db::models::{ColumnName, Count, SchemaObject};
use crate::error::NestlogError;
use crate::utils::{is_sql_identifier, quote_ident};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
}

const fn col(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef { name, sql_type }
}

/// Columns of the first release of the table.
pub const BASE_COLUMNS: [ColumnDef; 30] = [
    col("datetime", "INT"),
    col("last_connect", "INT"),
    col("online", "TEXT"),
    col("device_serial", "TEXT"),
    col("device_name", "TEXT"),
    col("device_where", "TEXT"),
    col("label", "TEXT"),
    col("mode", "TEXT"),
    col("ambient_temperature", "INT"),
    col("temperature_scale", "TEXT"),
    col("humidity", "INT"),
    col("device_min_temperature", "INT"),
    col("device_max_temperature", "INT"),
    col("hvac_state", "TEXT"),
    col("hvac_fan", "TEXT"),
    col("hvac_emergency_heat", "TEXT"),
    col("target_temperature", "INT"),
    col("eco_temperature_high", "INT"),
    col("eco_temperature_low", "INT"),
    col("device_is_locked", "TEXT"),
    col("locked_temperature_low", "INT"),
    col("locked_temperature_high", "INT"),
    col("has_leaf", "TEXT"),
    col("device_can_heat", "TEXT"),
    col("device_can_cool", "TEXT"),
    col("device_has_humidifier", "TEXT"),
    col("device_has_dehumidifier", "TEXT"),
    col("device_has_fan", "TEXT"),
    col("device_has_hot_water_control", "TEXT"),
    col("device_postal_code", "TEXT"),
];

/// Added after the first release for heat-cool setpoints.
pub const SETPOINT_RANGE_COLUMNS: [ColumnDef; 2] =
    [col("target_lo_temperature", "INT"), col("target_hi_temperature", "INT")];

pub struct SchemaManager {
    path: PathBuf,
    table: String,
    view: String,
}

impl SchemaManager {
    pub fn new(cfg: &Config) -> Self {
        SchemaManager {
            path: cfg.database_path.clone(),
            table: cfg.table_name.clone(),
            view: cfg.view_name.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty database file. Returns `false`
    /// if the file already existed.
    pub fn ensure_database(&self) -> Result<bool, NestlogError> {
        if self.path.exists() {
            info!("Database exists at {}", self.path.display());
            return Ok(false);
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty())
            && !dir.exists()
        {
            std::fs::create_dir_all(dir).map_err(|e| NestlogError::io(dir, e))?;
            info!("Created directory {}", dir.display());
        }
        drop(establish(&self.path)?);
        info!("Database created at {}", self.path.display());
        Ok(true)
    }

    /// `CREATE TABLE` with every current column. Fails if the table exists.
    pub fn create_table(&self) -> Result<(), NestlogError> {
        let mut conn = establish(&self.path)?;
        if object_exists(&mut conn, "table", &self.table)? {
            return Err(NestlogError::Schema(format!("table {} already exists", self.table)));
        }
        let columns = BASE_COLUMNS
            .iter()
            .chain(SETPOINT_RANGE_COLUMNS.iter())
            .map(|c| format!("{} {}", c.name, c.sql_type))
            .collect::<Vec<_>>()
            .join(", ");
        diesel::sql_query(format!("CREATE TABLE {} ({})", quote_ident(&self.table), columns)).execute(&mut conn)?;
        info!("Table {} created in {}", self.table, self.path.display());
        Ok(())
    }

    pub fn create_table_if_missing(&self) -> Result<bool, NestlogError> {
        let mut conn = establish(&self.path)?;
        if object_exists(&mut conn, "table", &self.table)? {
            return Ok(false);
        }
        drop(conn);
        self.create_table().map(|_| true)
    }

    /// One `ALTER TABLE .. ADD COLUMN` per column, all in one transaction. Fails
    /// without changing anything if the table is missing or any column exists.
    pub fn add_columns(&self, columns: &[ColumnDef]) -> Result<(), NestlogError> {
        for c in columns {
            if !is_sql_identifier(c.name) || !is_sql_identifier(c.sql_type) {
                return Err(NestlogError::Schema(format!("invalid column definition {} {}", c.name, c.sql_type)));
            }
        }
        let mut conn = establish(&self.path)?;
        let existing = table_columns(&mut conn, &self.table)?;
        if existing.is_empty() {
            return Err(NestlogError::Schema(format!("table {} does not exist", self.table)));
        }
        if let Some(dup) = columns.iter().find(|c| existing.iter().any(|e| e.eq_ignore_ascii_case(c.name))) {
            return Err(NestlogError::Schema(format!(
                "column {} already exists in {}",
                dup.name, self.table
            )));
        }

        conn.transaction::<_, NestlogError, _>(|conn| {
            for c in columns {
                diesel::sql_query(format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    quote_ident(&self.table),
                    c.name,
                    c.sql_type
                ))
                .execute(conn)?;
            }
            Ok(())
        })?;
        info!(
            "Column(s) {} added to {}",
            columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
            self.table
        );
        Ok(())
    }

    /// Add only the columns the table lacks; returns their names.
    pub fn add_missing_columns(&self, columns: &[ColumnDef]) -> Result<Vec<&'static str>, NestlogError> {
        let existing = self.table_columns()?;
        let missing = columns
            .iter()
            .filter(|c| !existing.iter().any(|e| e.eq_ignore_ascii_case(c.name)))
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            self.add_columns(&missing)?;
        }
        Ok(missing.iter().map(|c| c.name).collect())
    }

    /// Define the read view: epoch columns rendered as datetimes plus the core
    /// temperature and setpoint columns. Fails if the view exists.
    pub fn create_view(&self) -> Result<(), NestlogError> {
        let mut conn = establish(&self.path)?;
        if object_exists(&mut conn, "view", &self.view)? {
            return Err(NestlogError::Schema(format!("view {} already exists", self.view)));
        }
        diesel::sql_query(format!(
            "CREATE VIEW {} AS SELECT \
             datetime(datetime, 'unixepoch') AS datetime, \
             datetime(last_connect, 'unixepoch') AS last_connect, \
             device_name, ambient_temperature, humidity, hvac_state, hvac_fan, \
             target_temperature, target_lo_temperature, target_hi_temperature \
             FROM {}",
            quote_ident(&self.view),
            quote_ident(&self.table)
        ))
        .execute(&mut conn)?;
        info!("View {} created in {}", self.view, self.path.display());
        Ok(())
    }

    pub fn create_view_if_missing(&self) -> Result<bool, NestlogError> {
        let mut conn = establish(&self.path)?;
        if object_exists(&mut conn, "view", &self.view)? {
            return Ok(false);
        }
        drop(conn);
        self.create_view().map(|_| true)
    }

    /// Fails if the view does not exist.
    pub fn drop_view(&self) -> Result<(), NestlogError> {
        let mut conn = establish(&self.path)?;
        if !object_exists(&mut conn, "view", &self.view)? {
            return Err(NestlogError::Schema(format!("view {} does not exist", self.view)));
        }
        diesel::sql_query(format!("DROP VIEW {}", quote_ident(&self.view))).execute(&mut conn)?;
        info!("View {} dropped in {}", self.view, self.path.display());
        Ok(())
    }

    pub fn drop_view_if_exists(&self) -> Result<bool, NestlogError> {
        let mut conn = establish(&self.path)?;
        if !object_exists(&mut conn, "view", &self.view)? {
            return Ok(false);
        }
        drop(conn);
        self.drop_view().map(|_| true)
    }

    /// Every table, view, index and trigger with its defining statement.
    /// Each call re-reads the catalog.
    pub fn describe_schema(&self) -> Result<Vec<SchemaObject>, NestlogError> {
        let mut conn = establish(&self.path)?;
        let objects = diesel::sql_query(
            "SELECT type AS object_type, name, tbl_name AS table_name, rootpage AS root_page, sql \
             FROM sqlite_master",
        )
        .load::<SchemaObject>(&mut conn)?;
        Ok(objects)
    }

    /// Column names of the table in declaration order; empty if it does not exist.
    pub fn table_columns(&self) -> Result<Vec<String>, NestlogError> {
        let mut conn = establish(&self.path)?;
        table_columns(&mut conn, &self.table)
    }
}

fn object_exists(conn: &mut SqliteConnection, kind: &str, name: &str) -> Result<bool, NestlogError> {
    let count: Count =
        diesel::sql_query("SELECT COUNT(*) AS n FROM sqlite_master WHERE type = ? AND name = ? COLLATE NOCASE")
            .bind::<Text, _>(kind)
            .bind::<Text, _>(name)
            .get_result(conn)?;
    Ok(count.n > 0)
}

fn table_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<String>, NestlogError> {
    let cols = diesel::sql_query("SELECT name FROM pragma_table_info(?)")
        .bind::<Text, _>(table)
        .load::<ColumnName>(conn)?;
    Ok(cols.into_iter().map(|c| c.name).collect())
}
