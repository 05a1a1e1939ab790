//! Brings the database up to date: file, table, setpoint-range columns and a
//! freshly defined view, then prints the schema.

use log::{error, info};
use nestlog::config::Config;
use nestlog::error::NestlogError;
use nestlog::services::schema_manager::{SchemaManager, SETPOINT_RANGE_COLUMNS};

fn run() -> Result<(), NestlogError> {
    let cfg = Config::from_env()?;
    let sm = SchemaManager::new(&cfg);
    info!("Managing schema of {}", sm.path().display());

    sm.ensure_database()?;
    if !sm.create_table_if_missing()? {
        info!("Table {} already present", cfg.table_name);
    }
    let added = sm.add_missing_columns(&SETPOINT_RANGE_COLUMNS)?;
    if added.is_empty() {
        info!("Table {} has all columns; no migration applied", cfg.table_name);
    }

    // the view owns no data; always redefine it against the current columns
    sm.drop_view_if_exists()?;
    sm.create_view()?;

    for object in sm.describe_schema()? {
        println!("Database Object Type: {}", object.object_type);
        println!("Database Object Name: {}", object.name);
        println!("Table Name: {}", object.table_name);
        println!("Root page: {}", object.root_page);
        println!("**SQL Statement**: {}", object.sql.as_deref().unwrap_or("-"));
    }
    Ok(())
}

fn main() {
    let loaded_env = match nestlog::env_file::load_default() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    nestlog::init_logging();

    if let Some(path) = loaded_env.as_ref() {
        info!("Environment loaded from {}", path.display());
    }

    info!(
        "nestlog-schema {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
