//! # Bounded-concurrency ephemeris client
//!
//! Queries the JPL Horizons service for the topocentric position, apparent
//! magnitude, and altitude/azimuth of each candidate at every sampling instant
//! of the window. This is the pipeline's only concurrency surface and its only
//! failure-tolerance surface.
//!
//! ## Request model
//! -----------------
//! One HTTP request per candidate carries the full time-point list (the
//! service accepts a `TLIST` of epochs), and that request is the unit of
//! retry. Requests are dispatched through a fixed-size pool implemented with
//! `buffer_unordered`; the limit comes from the configuration, never an
//! unbounded fan-out.
//!
//! ## Failure tolerance
//! -----------------
//! Each request is independently retried a fixed number of times with a linear
//! backoff. A request that keeps failing marks its designation as dropped and
//! is *excluded* from the result map; it never aborts the batch. Callers must
//! treat a missing designation as "no data", not as an error.
//!
//! ## Response format
//! -----------------
//! The Horizons file API answers with a text report whose data rows sit
//! between `$$SOE` and `$$EOE` markers. With `CSV_FORMAT=YES` and
//! `QUANTITIES='1,4,9'` each row is a comma-separated record:
//!
//! ```text
//! date, solar presence, lunar presence, RA, DEC, azimuth, elevation, APmag, S-brt
//! ```
//!
//! Rows come back in `TLIST` order, so they are zipped with the requested
//! epochs. Rows with unparsable numeric fields (e.g. `n.a.` magnitudes) are
//! dropped individually.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use hifitime::Epoch;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Observer;
use crate::constants::{Degree, Magnitude, HORIZONS_API_URL};
use crate::errors::PlannerError;

/// Position and brightness of one candidate at one instant, in the observer's
/// topocentric frame. Produced only by this module; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSample {
    pub designation: String,
    pub epoch: Epoch,
    /// right ascension, degrees (ICRF)
    pub ra: Degree,
    /// declination, degrees (ICRF)
    pub dec: Degree,
    pub magnitude: Magnitude,
    /// apparent altitude above the local horizon, degrees
    pub altitude: Degree,
    /// azimuth, degrees east of north
    pub azimuth: Degree,
}

/// One logical query: a designation, the observer site, and the epochs to
/// evaluate (MJD UTC).
#[derive(Debug, Clone)]
pub struct EphemerisRequest {
    pub designation: String,
    pub observer: Observer,
    pub epochs_mjd: Vec<f64>,
}

/// Transport seam between retry/concurrency logic and the actual service.
///
/// The production implementation is [`HorizonsTransport`]; tests substitute a
/// scripted one to exercise the retry and partial-failure semantics without
/// the network.
#[async_trait]
pub trait EphemerisTransport: Send + Sync {
    /// Perform one request attempt and return the raw service response body.
    async fn fetch(&self, request: &EphemerisRequest) -> Result<String, PlannerError>;
}

/// HTTP transport against the JPL Horizons file API.
pub struct HorizonsTransport {
    client: reqwest::Client,
}

impl HorizonsTransport {
    /// Build the transport with a fixed per-request timeout; exceeding it is a
    /// retryable failure like any other transport error.
    pub fn new(timeout: Duration) -> Result<Self, PlannerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HorizonsTransport { client })
    }
}

#[async_trait]
impl EphemerisTransport for HorizonsTransport {
    async fn fetch(&self, request: &EphemerisRequest) -> Result<String, PlannerError> {
        let input = horizons_input(request);
        let response = self
            .client
            .post(HORIZONS_API_URL)
            .form(&[("format", "text"), ("input", input.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Build the Horizons file-API parameter block for one request.
///
/// The observer site goes in as geodetic `SITE_COORD` (east longitude,
/// latitude, elevation in km), so the service returns apparent altitude and
/// azimuth already in the topocentric frame.
fn horizons_input(request: &EphemerisRequest) -> String {
    format!(
        "
!$$SOF
COMMAND='{};'
OBJ_DATA='NO'
MAKE_EPHEM='YES'
TABLE_TYPE='OBSERVER'
CENTER='coord@399'
COORD_TYPE='GEODETIC'
SITE_COORD='{},{},{}'
TLIST_TYPE=MJD
TLIST={}
QUANTITIES='1,4,9'
ANG_FORMAT=DEG
CSV_FORMAT=YES
",
        request.designation,
        request.observer.longitude,
        request.observer.latitude,
        request.observer.elevation / 1000.0,
        request.epochs_mjd.iter().join(",")
    )
}

static EPHEM_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$SOE\s*\n(.*?)\$\$EOE").unwrap());

/// Column indices of a `QUANTITIES='1,4,9'` CSV data row.
const COL_RA: usize = 3;
const COL_DEC: usize = 4;
const COL_AZIMUTH: usize = 5;
const COL_ELEVATION: usize = 6;
const COL_MAGNITUDE: usize = 7;

/// Parse the `$$SOE`/`$$EOE` block of a Horizons observer-table response.
///
/// Arguments
/// ---------
/// * `designation`: candidate the response belongs to (for samples and
///   diagnostics).
/// * `body`: raw response text.
/// * `epochs`: the epochs that were requested, in `TLIST` order.
///
/// Return
/// ------
/// * The parsed samples, or [`PlannerError::EphemerisRequest`] when the block
///   is missing, the row count disagrees with the request, or no row parses.
pub(crate) fn parse_observer_table(
    designation: &str,
    body: &str,
    epochs: &[Epoch],
) -> Result<Vec<EphemerisSample>, PlannerError> {
    let block = EPHEM_BLOCK
        .captures(body)
        .and_then(|c| c.get(1))
        .ok_or_else(|| {
            PlannerError::EphemerisRequest(format!(
                "no ephemeris block in response for {designation}"
            ))
        })?
        .as_str();

    let rows: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
    if rows.len() != epochs.len() {
        return Err(PlannerError::EphemerisRequest(format!(
            "expected {} rows for {designation}, got {}",
            epochs.len(),
            rows.len()
        )));
    }

    let mut samples = Vec::with_capacity(rows.len());
    for (row, epoch) in rows.iter().zip(epochs) {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() <= COL_MAGNITUDE {
            continue;
        }
        let parsed = (
            fields[COL_RA].parse::<f64>(),
            fields[COL_DEC].parse::<f64>(),
            fields[COL_AZIMUTH].parse::<f64>(),
            fields[COL_ELEVATION].parse::<f64>(),
            fields[COL_MAGNITUDE].parse::<f64>(),
        );
        if let (Ok(ra), Ok(dec), Ok(azimuth), Ok(altitude), Ok(magnitude)) = parsed {
            samples.push(EphemerisSample {
                designation: designation.to_string(),
                epoch: *epoch,
                ra,
                dec,
                magnitude,
                altitude,
                azimuth,
            });
        }
    }

    if samples.is_empty() {
        return Err(PlannerError::EphemerisRequest(format!(
            "no parsable rows for {designation}"
        )));
    }
    Ok(samples)
}

/// Aggregate result of one batch query: partial by design.
#[derive(Debug, Default)]
pub struct QueryOutcome {
    /// samples per designation; permanently failed designations are absent
    pub samples: HashMap<String, Vec<EphemerisSample>>,
    /// designations queried
    pub queried: usize,
    /// designations dropped after exhausting retries
    pub failed: usize,
    /// total request attempts, retries included
    pub attempts: usize,
}

/// Bounded-concurrency, retrying client over an [`EphemerisTransport`].
pub struct EphemerisClient<T: EphemerisTransport> {
    transport: T,
    concurrency: usize,
    /// total attempts per request, first try included
    max_retries: u32,
    backoff: Duration,
}

struct CandidateOutcome {
    designation: String,
    attempts: u32,
    result: Result<Vec<EphemerisSample>, PlannerError>,
}

impl<T: EphemerisTransport> EphemerisClient<T> {
    pub fn new(transport: T, concurrency: usize, max_retries: u32, backoff: Duration) -> Self {
        EphemerisClient {
            transport,
            concurrency: concurrency.max(1),
            max_retries: max_retries.max(1),
            backoff,
        }
    }

    /// Query every designation at every epoch, tolerating partial failure.
    ///
    /// Result order carries no meaning; everything downstream keys by
    /// designation and epoch.
    pub async fn query(
        &self,
        designations: &[String],
        epochs: &[Epoch],
        observer: &Observer,
    ) -> QueryOutcome {
        let mjd_list: Vec<f64> = epochs.iter().map(|e| e.to_mjd_utc_days()).collect();

        let results: Vec<CandidateOutcome> = stream::iter(
            designations
                .iter()
                .map(|designation| self.query_one(designation, epochs, &mjd_list, observer)),
        )
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut outcome = QueryOutcome {
            queried: designations.len(),
            ..QueryOutcome::default()
        };
        for candidate in results {
            outcome.attempts += candidate.attempts as usize;
            match candidate.result {
                Ok(samples) => {
                    outcome.samples.insert(candidate.designation, samples);
                }
                Err(e) => {
                    outcome.failed += 1;
                    debug!("dropped {}: {e}", candidate.designation);
                }
            }
        }
        outcome
    }

    async fn query_one(
        &self,
        designation: &str,
        epochs: &[Epoch],
        mjd_list: &[f64],
        observer: &Observer,
    ) -> CandidateOutcome {
        let request = EphemerisRequest {
            designation: designation.to_string(),
            observer: observer.clone(),
            epochs_mjd: mjd_list.to_vec(),
        };

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if attempts > 1 {
                let delay = self.backoff * (attempts - 1);
                debug!("retrying {designation} after {delay:?}");
                tokio::time::sleep(delay).await;
            }

            let result = match self.transport.fetch(&request).await {
                Ok(body) => parse_observer_table(designation, &body, epochs),
                Err(e) => Err(e),
            };

            match result {
                Ok(samples) => {
                    debug!("{designation}: {} samples", samples.len());
                    return CandidateOutcome {
                        designation: request.designation,
                        attempts,
                        result: Ok(samples),
                    };
                }
                Err(e) if attempts >= self.max_retries => {
                    warn!("{designation} failed after {attempts} attempts: {e}");
                    return CandidateOutcome {
                        designation: request.designation,
                        attempts,
                        result: Err(e),
                    };
                }
                Err(e) => {
                    warn!(
                        "attempt {attempts}/{} failed for {designation}: {e}",
                        self.max_retries
                    );
                }
            }
        }
    }
}
