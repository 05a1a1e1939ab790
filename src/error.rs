//! Error kinds shared by the poller and the schema manager.
//!
//! Nothing is recovered locally: every variant aborts the current invocation and
//! ends up on stderr via `main`.

use std::path::PathBuf;

#[derive(Debug)]
pub enum NestlogError {
    /// Credential file missing, unreadable or malformed.
    Credential(String),
    /// Vendor rejected the token, or a PIN was needed and none was supplied.
    Authorization(String),
    /// A vendor timestamp did not match the expected pattern.
    Format(String),
    /// DDL invoked against a database already (or not yet) in the expected state.
    Schema(String),
    /// Filesystem access denied.
    Permission { path: PathBuf, source: std::io::Error },
    /// Underlying database I/O failure.
    Storage(String),
    /// Vendor API transport, status or payload failure.
    Api(String),
    /// Invalid configuration value.
    Config(String),
}

impl core::fmt::Display for NestlogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NestlogError::Credential(s) => write!(f, "credential error: {}", s),
            NestlogError::Authorization(s) => write!(f, "authorization error: {}", s),
            NestlogError::Format(s) => write!(f, "format error: {}", s),
            NestlogError::Schema(s) => write!(f, "schema error: {}", s),
            NestlogError::Permission { path, source } => {
                write!(f, "permission error: {}: {}", path.display(), source)
            }
            NestlogError::Storage(s) => write!(f, "storage error: {}", s),
            NestlogError::Api(s) => write!(f, "api error: {}", s),
            NestlogError::Config(s) => write!(f, "config error: {}", s),
        }
    }
}

impl std::error::Error for NestlogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NestlogError::Permission { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<diesel::result::Error> for NestlogError {
    fn from(value: diesel::result::Error) -> Self {
        NestlogError::Storage(value.to_string())
    }
}

impl From<diesel::result::ConnectionError> for NestlogError {
    fn from(value: diesel::result::ConnectionError) -> Self {
        NestlogError::Storage(format!("connection failed: {}", value))
    }
}

impl NestlogError {
    /// Classify an I/O failure on `path`: denied access becomes `Permission`,
    /// anything else is a storage failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            NestlogError::Permission { path, source }
        } else {
            NestlogError::Storage(format!("{}: {}", path.display(), source))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_classifies_permission_denied() {
        let err = NestlogError::io("/root/nest", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, NestlogError::Permission { .. }));

        let err = NestlogError::io("/root/nest", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, NestlogError::Storage(_)));
    }

    #[test]
    fn display_prefixes_kind() {
        let err = NestlogError::Schema("table thermostat already exists".into());
        assert_eq!(err.to_string(), "schema error: table thermostat already exists");
    }
}
