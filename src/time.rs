//! Small time helpers built on [hifitime](https://docs.rs/hifitime): window
//! sampling, local-midnight anchoring, and the two formatting routines the
//! report needs. UTC offsets are plain hour offsets supplied by the
//! configuration; no time-zone database is involved.

use hifitime::{Duration, Epoch};

/// Sampling instants from `start` to `end` (inclusive) every `step_minutes`.
pub fn sample_epochs(start: Epoch, end: Epoch, step_minutes: u32) -> Vec<Epoch> {
    let step = Duration::from_seconds(f64::from(step_minutes) * 60.0);
    let mut points = Vec::new();
    let mut t = start;
    while t <= end {
        points.push(t);
        t = t + step;
    }
    points
}

/// The local midnight closest to the middle of the observing window, as a UTC
/// epoch.
///
/// An MJD boundary is midnight, so shifting the window midpoint into local
/// time, rounding its MJD to the nearest integer, and shifting back yields the
/// anchor instant used by the transit tie-break.
pub fn nearest_local_midnight(start: Epoch, end: Epoch, utc_offset_hours: f64) -> Epoch {
    let offset = Duration::from_seconds(utc_offset_hours * 3600.0);
    let midpoint = start + Duration::from_seconds((end - start).to_seconds() * 0.5);
    let local_mjd = (midpoint + offset).to_mjd_utc_days();
    Epoch::from_mjd_utc(local_mjd.round()) - offset
}

/// `HH:MM` in the observer's local time.
pub fn local_hhmm(epoch: Epoch, utc_offset_hours: f64) -> String {
    let local = epoch + Duration::from_seconds(utc_offset_hours * 3600.0);
    let (_, _, _, hour, minute, _, _) = local.to_gregorian_utc();
    format!("{hour:02}:{minute:02}")
}

/// `YYYY-MM-DD` of the UTC date.
pub fn utc_date(epoch: Epoch) -> String {
    let (year, month, day, _, _, _, _) = epoch.to_gregorian_utc();
    format!("{year:04}-{month:02}-{day:02}")
}
