pub mod models {
    pub mod nest;
}

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod db {
    pub mod connection;
    pub mod models;
    pub mod schema;
}
pub mod env_file;
pub mod error;
pub mod snapshot;
pub mod time;
pub mod utils;
pub mod services {
    pub mod ingest;
    pub mod normalize;
    pub mod poller;
    pub mod schema_manager;
}

/// Initialize `env_logger` with `info` as the default filter. Call after the
/// `.env` file is loaded so `RUST_LOG` from it is respected.
pub fn init_logging() {
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();
}
