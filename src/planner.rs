//! # Pipeline orchestration
//!
//! Wires the stages together in their strict left-to-right order: catalog →
//! candidate filter → ephemeris client → visibility evaluator → list
//! composer. Each stage owns and fully produces its output collection before
//! the next one starts; the horizon mask and observer profile are read-only
//! inputs for the whole run.
//!
//! The transport is a type parameter so the whole pipeline downstream of the
//! catalog can run against a scripted service in tests.

use std::fmt;

use hifitime::Epoch;
use tracing::{info, warn};

use crate::candidates::{filter_candidates, main_belt};
use crate::catalog::{CatalogEntry, CatalogLoader};
use crate::config::PlannerConfig;
use crate::conversion::{dec_to_dms, ra_to_hms};
use crate::ephemeris::{EphemerisClient, EphemerisTransport};
use crate::errors::PlannerError;
use crate::report::{compose, ObservationList};
use crate::time::local_hhmm;
use crate::visibility::{evaluate, VisibilityRecord};

/// Counts reported with every successful run, empty list or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// catalog entries that reached the candidate filter
    pub considered: usize,
    /// candidates sent to the ephemeris service
    pub queried: usize,
    /// candidates dropped after exhausting retries
    pub failed: usize,
    /// candidates that cleared the horizon mask and magnitude band
    pub visible: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "considered {} candidates, queried {}, {} failed, {} visible",
            self.considered, self.queried, self.failed, self.visible
        )
    }
}

/// Full planning run: load the catalog, then hand off to [`plan_candidates`].
pub async fn run_plan<T: EphemerisTransport>(
    config: &PlannerConfig,
    transport: T,
) -> Result<(ObservationList, RunSummary), PlannerError> {
    let loader = CatalogLoader::from_config(config)?;
    let entries = loader.load().await?;
    let considered = entries.len();

    let candidates = filter_candidates(entries, &config.magnitude, main_belt);
    let (list, mut summary) = plan_candidates(candidates, config, transport).await?;
    summary.considered = considered;

    Ok((list, summary))
}

/// Run the network and geometry stages over an already-filtered candidate set.
///
/// This is the pipeline downstream of the candidate filter; `summary.considered`
/// is filled with the candidate count and adjusted by [`run_plan`] when the
/// catalog stage ran too.
pub async fn plan_candidates<T: EphemerisTransport>(
    candidates: Vec<CatalogEntry>,
    config: &PlannerConfig,
    transport: T,
) -> Result<(ObservationList, RunSummary), PlannerError> {
    let mask = config.horizon_mask()?;
    let epochs = config.time_points()?;
    let local_midnight = config.local_midnight()?;

    let client = EphemerisClient::new(
        transport,
        config.query.concurrency,
        config.query.max_retries,
        config.retry_backoff(),
    );

    let designations: Vec<String> = candidates.iter().map(|c| c.designation.clone()).collect();
    info!(
        "querying {} candidates at {} time points (concurrency {})",
        designations.len(),
        epochs.len(),
        config.query.concurrency
    );
    let outcome = client.query(&designations, &epochs, &config.observer).await;

    let mut records: Vec<VisibilityRecord> = Vec::new();
    for candidate in &candidates {
        // absent designations are "no data", never an error
        let Some(samples) = outcome.samples.get(&candidate.designation) else {
            continue;
        };
        if let Some(record) = evaluate(
            samples,
            candidate.name.clone(),
            &mask,
            &config.magnitude,
            local_midnight,
        ) {
            records.push(record);
        }
    }

    let summary = RunSummary {
        considered: candidates.len(),
        queried: outcome.queried,
        failed: outcome.failed,
        visible: records.len(),
    };

    if records.is_empty() {
        warn!("pipeline completed but no candidate is visible; writing an empty list");
    }

    let generated_at = Epoch::now().map_err(|e| PlannerError::InvalidTime(e.to_string()))?;
    let list = compose(records, config.target_count, generated_at);

    info!("{summary}");
    Ok((list, summary))
}

/// Single-target visibility check: a thin wrapper around the same ephemeris
/// and horizon primitives, exercised for one designation.
pub async fn run_check<T: EphemerisTransport>(
    designation: &str,
    config: &PlannerConfig,
    transport: T,
) -> Result<String, PlannerError> {
    let mask = config.horizon_mask()?;
    let epochs = config.time_points()?;
    let local_midnight = config.local_midnight()?;

    let client = EphemerisClient::new(
        transport,
        1,
        config.query.max_retries,
        config.retry_backoff(),
    );
    let outcome = client
        .query(&[designation.to_string()], &epochs, &config.observer)
        .await;

    let Some(samples) = outcome.samples.get(designation) else {
        return Err(PlannerError::EphemerisRequest(format!(
            "no ephemeris data for {designation}"
        )));
    };

    let offset = config.observer.utc_offset;
    let mut out = String::new();
    out.push_str(&format!(
        "Target {designation} from ({:.3}, {:.3})\n",
        config.observer.latitude, config.observer.longitude
    ));
    out.push_str("local   mag    alt     az     status\n");
    for sample in samples {
        let visible = mask.is_visible(sample.azimuth, sample.altitude);
        out.push_str(&format!(
            "{}   {:>5.2} {:>6.1} {:>6.1}   {}\n",
            local_hhmm(sample.epoch, offset),
            sample.magnitude,
            sample.altitude,
            sample.azimuth,
            if visible {
                "visible"
            } else {
                "below horizon mask"
            }
        ));
    }

    match evaluate(samples, None, &mask, &config.magnitude, local_midnight) {
        Some(record) => {
            out.push_str(&format!(
                "best viewing at {} local: RA {} DEC {} alt {:.1} az {:.1} mag {:.2}\n",
                local_hhmm(record.transit, offset),
                ra_to_hms(record.ra),
                dec_to_dms(record.dec),
                record.altitude,
                record.azimuth,
                record.magnitude
            ));
        }
        None => out.push_str("not visible in the configured window\n"),
    }

    Ok(out)
}
