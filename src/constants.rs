//! # Constants and type definitions for obsplan
//!
//! This module centralizes the **unit type aliases**, **service endpoints**, and the
//! handful of numeric constants shared by the planning pipeline. Everything that
//! is observer- or run-specific lives in [`crate::config::PlannerConfig`] instead.

/// Angle in degrees
pub type Degree = f64;

/// Apparent or absolute visual magnitude
pub type Magnitude = f64;

/// Semi-major axis or distance in astronomical units
pub type AstronomicalUnit = f64;

/// Degrees of right ascension per hour of right ascension
pub const DEG_PER_HOUR: f64 = 15.0;

/// Default bulk orbital-element catalog published by the Minor Planet Center
pub const MPCORB_URL: &str = "https://www.minorplanetcenter.net/iau/MPCORB/MPCORB.DAT";

/// File name used for the verbatim on-disk copy of the catalog
pub const MPCORB_FILE: &str = "MPCORB.DAT";

/// JPL Horizons file API endpoint used for ephemeris queries
pub const HORIZONS_API_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons_file.api";

/// Default path of the output artifact when the configuration does not override it
pub const DEFAULT_OUTPUT_FILE: &str = "asteroid_targets.csv";

/// Inner edge of the main asteroid belt in au
pub const MAIN_BELT_MIN_AU: AstronomicalUnit = 2.0;

/// Outer edge of the main asteroid belt in au
pub const MAIN_BELT_MAX_AU: AstronomicalUnit = 3.6;

/// Eccentricity above which an orbit is no longer treated as main-belt
pub const MAIN_BELT_MAX_ECC: f64 = 0.45;
