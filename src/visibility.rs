//! # Visibility evaluation and transit selection
//!
//! Combines the ephemeris samples of one designation with the horizon mask and
//! the configured magnitude band, and anchors the surviving candidate at its
//! best-viewing instant.
//!
//! Transit selection is sample-based: among the samples that clear the mask
//! and sit inside the band, the one with the highest altitude wins; an exact
//! altitude tie prefers the sample closer to local midnight of the observing
//! window. With the coarse sampling the planner uses, the nearest sample to
//! true culmination is the documented contract; no finer search is performed.

use hifitime::Epoch;

use crate::config::MagnitudeBand;
use crate::constants::{Degree, Magnitude};
use crate::ephemeris::EphemerisSample;
use crate::horizon::HorizonMask;

/// One candidate anchored at its transit instant, immutable once computed.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityRecord {
    pub designation: String,
    pub name: Option<String>,
    /// best observation instant within the window
    pub transit: Epoch,
    pub ra: Degree,
    pub dec: Degree,
    pub magnitude: Magnitude,
    pub altitude: Degree,
    pub azimuth: Degree,
}

/// Evaluate one designation's window of samples against the mask and band.
///
/// Arguments
/// ---------
/// * `samples`: the designation's ephemeris samples, in window order.
/// * `name`: catalog name carried through to the record.
/// * `mask`: the observer's horizon mask.
/// * `band`: apparent-magnitude acceptance band.
/// * `local_midnight`: tie-break anchor for equal-altitude samples.
///
/// Return
/// ------
/// * `Some(VisibilityRecord)` anchored at the transit sample, or `None` when
///   no sample is both above the mask and inside the band.
pub fn evaluate(
    samples: &[EphemerisSample],
    name: Option<String>,
    mask: &HorizonMask,
    band: &MagnitudeBand,
    local_midnight: Epoch,
) -> Option<VisibilityRecord> {
    let midnight_distance =
        |sample: &EphemerisSample| (sample.epoch - local_midnight).to_seconds().abs();

    let best = samples
        .iter()
        .filter(|s| band.contains(s.magnitude) && mask.is_visible(s.azimuth, s.altitude))
        .max_by(|a, b| {
            a.altitude
                .total_cmp(&b.altitude)
                // equal altitude: the sample closer to midnight wins
                .then_with(|| midnight_distance(b).total_cmp(&midnight_distance(a)))
        })?;

    Some(VisibilityRecord {
        designation: best.designation.clone(),
        name,
        transit: best.epoch,
        ra: best.ra,
        dec: best.dec,
        magnitude: best.magnitude,
        altitude: best.altitude,
        azimuth: best.azimuth,
    })
}
