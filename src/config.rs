//! Runtime configuration, read from the environment.
//! Defaults match the historical layout under `~/nest/`.

use chrono::FixedOffset;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::NestlogError;
use crate::utils::is_sql_identifier;

pub const DEFAULT_DIR_NAME: &str = "nest";
pub const DEFAULT_DATABASE_FILE: &str = "nestlog.sdb";
pub const DEFAULT_CLIENT_INFO_FILE: &str = "nestlog.json";
pub const DEFAULT_TOKEN_CACHE_FILE: &str = "nest.json";
pub const DEFAULT_TABLE: &str = "thermostat";
pub const DEFAULT_VIEW: &str = "V_Thermostat";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// JSON file holding `nest_client_info`.
    pub client_info_path: PathBuf,
    /// Where the OAuth access token is cached after the PIN exchange.
    pub token_cache_path: PathBuf,
    pub table_name: String,
    pub view_name: String,
    /// Pre-supplied authorization PIN for non-interactive first runs.
    pub pin: Option<String>,
    /// Fixed UTC offset; when unset the host's current offset is used.
    pub utc_offset: Option<FixedOffset>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, NestlogError> {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Build from an arbitrary variable source; `home` anchors the default directory.
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Result<Self, NestlogError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let dir = match var("NESTLOG_DIR") {
            Some(d) => PathBuf::from(d),
            None => home
                .map(|h| h.join(DEFAULT_DIR_NAME))
                .ok_or_else(|| NestlogError::Config("cannot resolve home directory; set NESTLOG_DIR".to_string()))?,
        };
        let path_or = |key: &str, file: &str| var(key).map(PathBuf::from).unwrap_or_else(|| dir.join(file));

        let table_name = var("NESTLOG_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let view_name = var("NESTLOG_VIEW").unwrap_or_else(|| DEFAULT_VIEW.to_string());
        for (key, name) in [("NESTLOG_TABLE", &table_name), ("NESTLOG_VIEW", &view_name)] {
            if !is_sql_identifier(name) {
                return Err(NestlogError::Config(format!("{} must be a plain SQL identifier, got {:?}", key, name)));
            }
        }

        let utc_offset = match var("NESTLOG_UTC_OFFSET_SECS") {
            Some(s) => {
                let secs = s
                    .parse::<i32>()
                    .map_err(|_| NestlogError::Config("NESTLOG_UTC_OFFSET_SECS must be an integer".to_string()))?;
                Some(FixedOffset::east_opt(secs).ok_or_else(|| {
                    NestlogError::Config(format!("NESTLOG_UTC_OFFSET_SECS out of range: {}", secs))
                })?)
            }
            None => None,
        };

        let http_timeout_secs = match var("NESTLOG_HTTP_TIMEOUT_SECS") {
            Some(s) => match s.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(NestlogError::Config(format!(
                        "NESTLOG_HTTP_TIMEOUT_SECS must be a positive integer, got {:?}",
                        s
                    )));
                }
            },
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Config {
            database_path: path_or("NESTLOG_DATABASE", DEFAULT_DATABASE_FILE),
            client_info_path: path_or("NESTLOG_CLIENT_INFO", DEFAULT_CLIENT_INFO_FILE),
            token_cache_path: path_or("NESTLOG_TOKEN_CACHE", DEFAULT_TOKEN_CACHE_FILE),
            table_name,
            view_name,
            pin: var("NEST_PIN"),
            utc_offset,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Configuration rooted in `dir` with every other value at its default.
    #[cfg(test)]
    pub(crate) fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Config {
            database_path: dir.join(DEFAULT_DATABASE_FILE),
            client_info_path: dir.join(DEFAULT_CLIENT_INFO_FILE),
            token_cache_path: dir.join(DEFAULT_TOKEN_CACHE_FILE),
            table_name: DEFAULT_TABLE.to_string(),
            view_name: DEFAULT_VIEW.to_string(),
            pin: None,
            utc_offset: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}
