//! Blocking HTTP client for the Nest developer API.
//!
//! - Uses `ureq` (no async).
//! - Only what a poll needs: the PIN-based OAuth exchange and the root document,
//!   which carries every structure and thermostat the token can see.
//!
//! Authentication
//! - First run: the operator opens `authorize_url`, approves access and is shown a PIN.
//!   `request_token(pin)` trades it for an access token, cached on disk as JSON.
//! - Later runs reuse the cached token; a 401 means it was revoked.

use http::StatusCode;
use log::{debug, info};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::ClientInfo;
use crate::error::NestlogError;
use crate::models::nest::ApiRoot;
use crate::snapshot::Structure;

const AUTHORIZE_URL: &str = "https://home.nest.com/login/oauth2";
const ACCESS_TOKEN_URL: &str = "https://api.home.nest.com/oauth2/access_token";
const API_URL: &str = "https://developer-api.nest.com/";
const MAX_REDIRECTS: usize = 3;

/// Device-reading capability of the vendor API.
pub trait ThermostatApi {
    /// True until a token is available.
    fn authorization_required(&self) -> bool;
    /// Page the operator visits to obtain a PIN.
    fn authorize_url(&self) -> String;
    /// Exchange an operator-supplied PIN for an access token.
    fn request_token(&mut self, pin: &str) -> Result<(), NestlogError>;
    /// Every accessible structure with its thermostats.
    fn structures(&self) -> Result<Vec<Structure>, NestlogError>;
}

/// Token as returned by the access-token endpoint and stored in the cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

pub struct NestClient {
    agent: ureq::Agent,
    client: ClientInfo,
    token_cache: PathBuf,
    token: Option<AccessToken>,
    state: String,
}

impl NestClient {
    pub fn new(client: ClientInfo, token_cache: impl Into<PathBuf>, timeout: Duration) -> Result<Self, NestlogError> {
        let token_cache = token_cache.into();
        let token = read_token_cache(&token_cache)?;
        if token.is_some() {
            debug!("Loaded cached access token from {}", token_cache.display());
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            // redirects are followed by hand so the bearer header survives the host change
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .into();

        let state = format!("{:016x}", rand::rng().random::<u64>());

        Ok(NestClient {
            agent,
            client,
            token_cache,
            token,
            state,
        })
    }

    fn bearer(&self) -> Result<String, NestlogError> {
        self.token
            .as_ref()
            .map(|t| format!("Bearer {}", t.access_token))
            .ok_or_else(|| NestlogError::Authorization("no access token; authorization required".to_string()))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NestlogError> {
        let bearer = self.bearer()?;
        let mut url = url.to_string();
        for _ in 0..=MAX_REDIRECTS {
            let mut resp = self
                .agent
                .get(&url)
                .header("Accept", "application/json")
                .header("Authorization", &bearer)
                .call()
                .map_err(|e| NestlogError::Api(format!("GET {} failed: {}", url, e)))?;

            let status = resp.status();
            if status.is_redirection() {
                let location = resp
                    .headers()
                    .get(http::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| NestlogError::Api(format!("http {} from {} without Location", status, url)))?;
                let next = resolve_redirect(&url, location)?;
                debug!("Following {} redirect to {}", status.as_u16(), next);
                url = next;
                continue;
            }

            let body = resp
                .body_mut()
                .read_to_string()
                .map_err(|e| NestlogError::Api(format!("reading body of {} failed: {}", url, e)))?;
            return match status {
                s if s.is_success() => decode(&body),
                StatusCode::UNAUTHORIZED => Err(NestlogError::Authorization(format!(
                    "access token rejected (http 401): {}; remove {} to re-authorize",
                    body,
                    self.token_cache.display()
                ))),
                s => Err(NestlogError::Api(format!("http {}: {}", s.as_u16(), body))),
            };
        }
        Err(NestlogError::Api(format!("too many redirects fetching {}", url)))
    }
}

/// Resolve a `Location` header, absolute or relative, against the URL that sent it.
fn resolve_redirect(current: &str, location: &str) -> Result<String, NestlogError> {
    url::Url::parse(current)
        .and_then(|base| base.join(location))
        .map(String::from)
        .map_err(|e| NestlogError::Api(format!("bad redirect {:?} from {}: {}", location, current, e)))
}

impl ThermostatApi for NestClient {
    fn authorization_required(&self) -> bool {
        self.token.is_none()
    }

    fn authorize_url(&self) -> String {
        format!("{}?client_id={}&state={}", AUTHORIZE_URL, self.client.client_id, self.state)
    }

    fn request_token(&mut self, pin: &str) -> Result<(), NestlogError> {
        let mut resp = self
            .agent
            .post(ACCESS_TOKEN_URL)
            .header("Accept", "application/json")
            .send_form([
                ("client_id", self.client.client_id.as_str()),
                ("client_secret", self.client.client_secret.as_str()),
                ("code", pin),
                ("grant_type", "authorization_code"),
            ])
            .map_err(|e| NestlogError::Api(format!("token request failed: {}", e)))?;
        let status = resp.status();
        let body = resp
            .body_mut()
            .read_to_string()
            .map_err(|e| NestlogError::Api(format!("reading token response failed: {}", e)))?;
        if !status.is_success() {
            return Err(NestlogError::Authorization(format!(
                "PIN rejected (http {}): {}",
                status.as_u16(),
                body
            )));
        }

        let token: AccessToken = decode(&body)?;
        write_token_cache(&self.token_cache, &token)?;
        info!("Access token cached at {}", self.token_cache.display());
        self.token = Some(token);
        Ok(())
    }

    fn structures(&self) -> Result<Vec<Structure>, NestlogError> {
        let root: ApiRoot = self.get_json(API_URL)?;
        root.into_structures()
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, NestlogError> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|e| NestlogError::Api(format!("json error: {}", e)))
}

/// A missing cache file means "not yet authorized"; an unreadable one is an error.
pub fn read_token_cache(path: &Path) -> Result<Option<AccessToken>, NestlogError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(NestlogError::io(path, e)),
    };
    let de = &mut serde_json::Deserializer::from_str(&raw);
    serde_path_to_error::deserialize(de)
        .map(Some)
        .map_err(|e| NestlogError::Credential(format!("token cache {}: {}", path.display(), e)))
}

pub fn write_token_cache(path: &Path, token: &AccessToken) -> Result<(), NestlogError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| NestlogError::io(dir, e))?;
    }
    let json = serde_json::to_string(token).map_err(|e| NestlogError::Api(format!("json error: {}", e)))?;
    std::fs::write(path, json).map_err(|e| NestlogError::io(path, e))
}
