//! # Azimuth-indexed horizon mask
//!
//! A [`HorizonMask`] holds the observer-specific minimum-altitude profile of the
//! local horizon as a cyclic sequence of `(azimuth, altitude)` samples, and
//! answers the single question the pipeline needs: *is this (azimuth, altitude)
//! pair above the obstructed skyline?*
//!
//! The mask is treated as circular: querying between the last and first sample
//! wraps around the 360°/0° boundary, and `min_altitude(a)` equals
//! `min_altitude(a + 360°)` for any azimuth.

use crate::constants::Degree;
use crate::errors::PlannerError;

/// Minimum-altitude-by-azimuth profile of the observer's real horizon.
///
/// Samples are normalized into `[0, 360)` and sorted by azimuth at construction
/// time; the mask is immutable afterwards.
#[derive(Debug, Clone)]
pub struct HorizonMask {
    /// `(azimuth, minimum altitude)` pairs, sorted by azimuth
    samples: Vec<(Degree, Degree)>,
}

impl HorizonMask {
    /// Build a mask from raw `[azimuth, altitude]` pairs.
    ///
    /// Arguments
    /// ---------
    /// * `points`: horizon samples in degrees, in any order; azimuths outside
    ///   `[0, 360)` are normalized.
    ///
    /// Return
    /// ------
    /// * The constructed mask, or [`PlannerError::Configuration`] if fewer than
    ///   two samples are supplied (interpolation needs a bracket).
    pub fn new(points: &[[Degree; 2]]) -> Result<Self, PlannerError> {
        if points.len() < 2 {
            return Err(PlannerError::Configuration(format!(
                "horizon mask needs at least 2 samples, got {}",
                points.len()
            )));
        }

        let mut samples: Vec<(Degree, Degree)> = points
            .iter()
            .map(|p| (p[0].rem_euclid(360.0), p[1]))
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(HorizonMask { samples })
    }

    /// Minimum unobstructed altitude at the given azimuth.
    ///
    /// The query azimuth is normalized into `[0, 360)`, the two bracketing
    /// samples are located treating the sequence as circular, and the altitude
    /// is linearly interpolated between them.
    pub fn min_altitude(&self, azimuth: Degree) -> Degree {
        let az = azimuth.rem_euclid(360.0);
        let n = self.samples.len();

        // index of the first sample strictly above the query azimuth
        let idx = self.samples.partition_point(|s| s.0 <= az);
        let (az0, alt0) = self.samples[(idx + n - 1) % n];
        let (az1, alt1) = self.samples[idx % n];

        let span = (az1 - az0).rem_euclid(360.0);
        if span == 0.0 {
            return alt0;
        }

        let frac = (az - az0).rem_euclid(360.0) / span;
        alt0 + frac * (alt1 - alt0)
    }

    /// True when `altitude` clears the mask at `azimuth`.
    pub fn is_visible(&self, azimuth: Degree, altitude: Degree) -> bool {
        altitude >= self.min_altitude(azimuth)
    }
}
