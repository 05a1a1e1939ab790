use chrono::{FixedOffset, NaiveDateTime, Utc};
use log::{debug, info};

use crate::auth::{authorize, PinSource};
use crate::client::ThermostatApi;
use crate::config::Config;
use crate::error::NestlogError;
use crate::services::ingest::insert_record;
use crate::services::normalize::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollSummary {
    pub structures: usize,
    pub rows_written: usize,
}

/// One poll: authorize, then write one row per thermostat.
pub fn run_once<A: ThermostatApi + ?Sized>(
    cfg: &Config,
    api: &mut A,
    pins: &mut dyn PinSource,
    offset: FixedOffset,
) -> Result<PollSummary, NestlogError> {
    run_once_at(cfg, api, pins, offset, || Utc::now().naive_utc())
}

/// As `run_once`, with the observation clock (naive UTC) supplied by the caller.
///
/// Each device gets its own connection and commit; an error aborts the poll but
/// keeps rows already written.
pub fn run_once_at<A, C>(
    cfg: &Config,
    api: &mut A,
    pins: &mut dyn PinSource,
    offset: FixedOffset,
    clock: C,
) -> Result<PollSummary, NestlogError>
where
    A: ThermostatApi + ?Sized,
    C: Fn() -> NaiveDateTime,
{
    authorize(api, pins)?;
    info!("Authenticated to Nest API");

    let structures = api.structures()?;
    info!("Discovered {} structure(s)", structures.len());

    let mut summary = PollSummary {
        structures: structures.len(),
        rows_written: 0,
    };
    for structure in &structures {
        debug!(
            "Structure {} ({}): {} thermostat(s)",
            structure.id,
            structure.name.as_deref().unwrap_or("-"),
            structure.thermostats.len()
        );
        for device in &structure.thermostats {
            let record = normalize(device, clock(), offset)?;
            insert_record(&cfg.database_path, &cfg.table_name, &record)?;
            summary.rows_written += 1;
            debug!(
                "Wrote {} (mode={}, hvac_state={}, target={:?})",
                record.device_serial,
                record.mode,
                record.hvac_state,
                record.shape.target_temperature()
            );
        }
    }
    info!(
        "Poll complete: {} row(s) written to {}",
        summary.rows_written,
        cfg.database_path.display()
    );
    Ok(summary)
}
