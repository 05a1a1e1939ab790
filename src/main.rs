use log::{error, info};
use nestlog::auth::pin_source;
use nestlog::client::NestClient;
use nestlog::config::Config;
use nestlog::credentials::load_client_info;
use nestlog::error::NestlogError;
use nestlog::services::poller;
use nestlog::time::host_offset;

fn run() -> Result<(), NestlogError> {
    // 1) Load config
    let cfg = Config::from_env()?;
    let offset = cfg.utc_offset.unwrap_or_else(host_offset);
    info!(
        "Config loaded (database={}, table={}, utc_offset={}s)",
        cfg.database_path.display(),
        cfg.table_name,
        offset.local_minus_utc()
    );

    // 2) Credentials
    let client_info = load_client_info(&cfg.client_info_path)?;

    // 3) Init Nest client (loads cached token if any)
    let mut client = NestClient::new(client_info, cfg.token_cache_path.clone(), cfg.http_timeout)?;

    // 4) Authorize and write one row per thermostat
    let mut pins = pin_source(cfg.pin.clone());
    poller::run_once(&cfg, &mut client, pins.as_mut(), offset)?;

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
        "nestlog-poll {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
