//! Vendor client credentials (`nestlog.json`).

use serde::Deserialize;
use std::path::Path;

use crate::error::NestlogError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientInfo {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    nest_client_info: Vec<ClientInfo>,
}

/// Read the first entry of `nest_client_info` from `path`.
pub fn load_client_info(path: &Path) -> Result<ClientInfo, NestlogError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| NestlogError::Credential(format!("cannot read {}: {}", path.display(), e)))?;
    parse_client_info(&raw).map_err(|e| match e {
        NestlogError::Credential(msg) => NestlogError::Credential(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

pub fn parse_client_info(raw: &str) -> Result<ClientInfo, NestlogError> {
    let de = &mut serde_json::Deserializer::from_str(raw);
    let file: CredentialFile =
        serde_path_to_error::deserialize(de).map_err(|e| NestlogError::Credential(e.to_string()))?;
    let info = file
        .nest_client_info
        .into_iter()
        .next()
        .ok_or_else(|| NestlogError::Credential("nest_client_info is empty".to_string()))?;
    if info.client_id.trim().is_empty() || info.client_secret.trim().is_empty() {
        return Err(NestlogError::Credential("client_id and client_secret must be non-empty".to_string()));
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_entry() {
        let info = parse_client_info(
            r#"{"nest_client_info":[
                {"client_id":"c0ffee","client_secret":"s3cret"},
                {"client_id":"other","client_secret":"ignored"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            info,
            ClientInfo {
                client_id: "c0ffee".into(),
                client_secret: "s3cret".into()
            }
        );
    }

    #[test]
    fn reports_path_of_malformed_field() {
        let err = parse_client_info(r#"{"nest_client_info":[{"client_id":7,"client_secret":"x"}]}"#).unwrap_err();
        match err {
            NestlogError::Credential(msg) => assert!(msg.contains("nest_client_info[0].client_id"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_or_missing_info() {
        for raw in [r#"{"nest_client_info":[]}"#, r#"{}"#, "not json", r#"{"nest_client_info":[{"client_id":"","client_secret":"x"}]}"#] {
            assert!(matches!(parse_client_info(raw), Err(NestlogError::Credential(_))), "{raw}");
        }
    }

    #[test]
    fn missing_file_is_credential_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_client_info(&dir.path().join("nestlog.json")).unwrap_err();
        assert!(matches!(err, NestlogError::Credential(_)));
    }
}
