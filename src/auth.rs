//! First-run authorization as an explicit state machine.
//!
//! `Unauthorized -> AwaitingPin -> Authorized`. The PIN comes from an injected
//! `PinSource`, so a cron run can fail fast instead of blocking on stdin.

use log::info;
use std::io::{BufRead, IsTerminal, Write};

use crate::client::ThermostatApi;
use crate::error::NestlogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthorized,
    AwaitingPin { authorize_url: String },
    Authorized,
}

/// Supplies the PIN shown to the operator after visiting `authorize_url`.
pub trait PinSource {
    /// `Ok(None)` means no PIN is available.
    fn pin(&mut self, authorize_url: &str) -> Result<Option<String>, NestlogError>;
}

/// A PIN supplied up front (config or environment).
pub struct PresetPin(pub String);

impl PinSource for PresetPin {
    fn pin(&mut self, _authorize_url: &str) -> Result<Option<String>, NestlogError> {
        Ok(Some(self.0.clone()))
    }
}

/// Never has a PIN; for unattended runs.
pub struct NoPin;

impl PinSource for NoPin {
    fn pin(&mut self, _authorize_url: &str) -> Result<Option<String>, NestlogError> {
        Ok(None)
    }
}

/// Prints the URL to stderr and reads one line from stdin.
pub struct ConsolePin;

impl PinSource for ConsolePin {
    fn pin(&mut self, authorize_url: &str) -> Result<Option<String>, NestlogError> {
        let mut stderr = std::io::stderr();
        let prompt = format!("Go to {} to authorize, then enter the PIN.\nPIN: ", authorize_url);
        stderr
            .write_all(prompt.as_bytes())
            .and_then(|_| stderr.flush())
            .map_err(|e| NestlogError::Authorization(format!("cannot prompt for PIN: {}", e)))?;
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| NestlogError::Authorization(format!("cannot read PIN: {}", e)))?;
        Ok(Some(line))
    }
}

/// Pick a PIN source: a preset PIN wins, then the console if stdin is a terminal.
pub fn pin_source(preset: Option<String>) -> Box<dyn PinSource> {
    match preset {
        Some(pin) => Box::new(PresetPin(pin)),
        None if std::io::stdin().is_terminal() => Box::new(ConsolePin),
        None => Box::new(NoPin),
    }
}

/// Advance the flow by one transition.
pub fn step<A: ThermostatApi + ?Sized>(
    state: AuthState,
    api: &mut A,
    pins: &mut dyn PinSource,
) -> Result<AuthState, NestlogError> {
    match state {
        AuthState::Unauthorized if api.authorization_required() => Ok(AuthState::AwaitingPin {
            authorize_url: api.authorize_url(),
        }),
        AuthState::Unauthorized => Ok(AuthState::Authorized),
        AuthState::AwaitingPin { authorize_url } => {
            let pin = pins
                .pin(&authorize_url)?
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    NestlogError::Authorization(format!(
                        "authorization required: visit {} and supply the PIN (NEST_PIN)",
                        authorize_url
                    ))
                })?;
            api.request_token(&pin)?;
            info!("Authorization PIN accepted");
            Ok(AuthState::Authorized)
        }
        AuthState::Authorized => Ok(AuthState::Authorized),
    }
}

/// Run the flow until authorized or an error occurs.
pub fn authorize<A: ThermostatApi + ?Sized>(api: &mut A, pins: &mut dyn PinSource) -> Result<(), NestlogError> {
    let mut state = AuthState::Unauthorized;
    while state != AuthState::Authorized {
        state = step(state, api, pins)?;
    }
    Ok(())
}
