use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::path::Path;

use crate::error::NestlogError;

/// How long a connection waits on another process's lock before failing.
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Open `path`, creating the file if needed. Connections are short-lived: one per
/// schema operation or per inserted row.
pub fn establish(path: &Path) -> Result<SqliteConnection, NestlogError> {
    let url = path
        .to_str()
        .ok_or_else(|| NestlogError::Config(format!("database path is not valid UTF-8: {}", path.display())))?;
    let mut conn = SqliteConnection::establish(url)
        .map_err(|e| NestlogError::Storage(format!("opening {} failed: {}", path.display(), e)))?;
    conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))?;
    Ok(conn)
}
