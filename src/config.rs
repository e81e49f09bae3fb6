//! # Run configuration
//!
//! Everything observer- or run-specific is collected into a single immutable
//! [`PlannerConfig`] value, deserialized from a TOML file once at startup and
//! passed by reference to every pipeline stage. There is no process-wide
//! mutable state: the script-style "edit the globals at the top of the file"
//! surface becomes an explicit configuration document.
//!
//! Any missing or inconsistent field is a [`PlannerError::Configuration`]
//! raised before the first network request.

use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use serde::Deserialize;

use crate::constants::{Degree, Magnitude, DEFAULT_OUTPUT_FILE};
use crate::errors::PlannerError;
use crate::horizon::HorizonMask;
use crate::time::{nearest_local_midnight, sample_epochs};

/// Geodetic observer site, shared read-only by every stage.
#[derive(Debug, Clone, Deserialize)]
pub struct Observer {
    /// degrees, positive north
    pub latitude: Degree,
    /// degrees east of Greenwich
    pub longitude: Degree,
    /// metres above the reference ellipsoid
    pub elevation: f64,
    /// hours east of UTC, e.g. 10.5 for ACDT
    pub utc_offset: f64,
}

/// Apparent-magnitude acceptance band `[min, max]`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MagnitudeBand {
    pub min: Magnitude,
    pub max: Magnitude,
}

impl MagnitudeBand {
    pub fn contains(&self, magnitude: Magnitude) -> bool {
        self.min <= magnitude && magnitude <= self.max
    }
}

/// Observation time window, sampled at a fixed step.
#[derive(Debug, Clone, Deserialize)]
pub struct Window {
    /// UTC, `YYYY-MM-DDTHH:MM:SS`
    pub start: String,
    /// UTC, `YYYY-MM-DDTHH:MM:SS`
    pub end: String,
    pub step_minutes: u32,
}

/// Knobs of the ephemeris client.
#[derive(Debug, Clone, Deserialize)]
pub struct QuerySettings {
    /// size of the bounded worker pool
    pub concurrency: usize,
    /// total attempts per request, first try included
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_seconds() -> u64 {
    2
}

fn default_timeout_seconds() -> u64 {
    60
}

/// Immutable configuration of one planning run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    pub observer: Observer,
    /// `[azimuth, min altitude]` horizon samples in degrees
    pub horizon: Vec<[Degree; 2]>,
    pub magnitude: MagnitudeBand,
    pub window: Window,
    pub query: QuerySettings,
    /// desired length of the final observation list
    pub target_count: usize,
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default)]
    pub catalog_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub output_path: Option<Utf8PathBuf>,
}

impl PlannerConfig {
    /// Read and validate a configuration file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, PlannerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlannerError::Configuration(format!("cannot read {path}: {e}"))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, PlannerError> {
        let config: PlannerConfig = toml::from_str(content)
            .map_err(|e| PlannerError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field consistency checks, run once before any network I/O.
    fn validate(&self) -> Result<(), PlannerError> {
        // construction performs the >= 2 samples check
        HorizonMask::new(&self.horizon)?;

        if !(-90.0..=90.0).contains(&self.observer.latitude) {
            return Err(PlannerError::Configuration(format!(
                "latitude {} out of [-90, 90]",
                self.observer.latitude
            )));
        }
        if self.magnitude.min >= self.magnitude.max {
            return Err(PlannerError::Configuration(format!(
                "magnitude band [{}, {}] is empty",
                self.magnitude.min, self.magnitude.max
            )));
        }
        if self.window.step_minutes == 0 {
            return Err(PlannerError::Configuration(
                "window.step_minutes must be positive".into(),
            ));
        }
        if self.window_start()? >= self.window_end()? {
            return Err(PlannerError::Configuration(format!(
                "window start {} is not before end {}",
                self.window.start, self.window.end
            )));
        }
        if self.query.concurrency == 0 {
            return Err(PlannerError::Configuration(
                "query.concurrency must be at least 1".into(),
            ));
        }
        if self.query.max_retries == 0 {
            return Err(PlannerError::Configuration(
                "query.max_retries must be at least 1".into(),
            ));
        }
        if self.target_count == 0 {
            return Err(PlannerError::Configuration(
                "target_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn horizon_mask(&self) -> Result<HorizonMask, PlannerError> {
        HorizonMask::new(&self.horizon)
    }

    pub fn window_start(&self) -> Result<Epoch, PlannerError> {
        parse_epoch(&self.window.start)
    }

    pub fn window_end(&self) -> Result<Epoch, PlannerError> {
        parse_epoch(&self.window.end)
    }

    /// Sampling instants covering the window at the configured step.
    pub fn time_points(&self) -> Result<Vec<Epoch>, PlannerError> {
        Ok(sample_epochs(
            self.window_start()?,
            self.window_end()?,
            self.window.step_minutes,
        ))
    }

    /// Local midnight used as the tie-break anchor for transit selection.
    pub fn local_midnight(&self) -> Result<Epoch, PlannerError> {
        Ok(nearest_local_midnight(
            self.window_start()?,
            self.window_end()?,
            self.observer.utc_offset,
        ))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.query.timeout_seconds)
    }

    pub fn retry_backoff(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.query.backoff_seconds)
    }

    pub fn output_file(&self) -> Utf8PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_FILE))
    }
}

fn parse_epoch(value: &str) -> Result<Epoch, PlannerError> {
    Epoch::from_str(value)
        .map_err(|e| PlannerError::Configuration(format!("invalid time '{value}': {e}")))
}
