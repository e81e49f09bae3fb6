//! Sexagesimal formatting of equatorial coordinates for the report and the
//! output artifact.

use crate::constants::{Degree, DEG_PER_HOUR};

/// Format a right ascension in degrees as `HH MM SS.SS`.
///
/// Arguments
/// ---------
/// * `ra`: right ascension in degrees; values outside `[0, 360)` are
///   normalized.
///
/// Return
/// ------
/// * The hour-angle string, zero-padded, rounded to hundredths of a second.
pub fn ra_to_hms(ra: Degree) -> String {
    // work in integer hundredths of a second of time to avoid 60.00 artifacts
    let hundredths = (ra.rem_euclid(360.0) / DEG_PER_HOUR * 360_000.0).round() as u64;
    let hours = (hundredths / 360_000) % 24;
    let minutes = (hundredths % 360_000) / 6_000;
    let seconds = (hundredths % 6_000) as f64 / 100.0;
    format!("{hours:02} {minutes:02} {seconds:05.2}")
}

/// Format a declination in degrees as `±DD MM SS.S`.
///
/// Arguments
/// ---------
/// * `dec`: declination in degrees, `[-90, +90]`.
///
/// Return
/// ------
/// * The signed sexagesimal string, rounded to tenths of an arcsecond.
pub fn dec_to_dms(dec: Degree) -> String {
    let sign = if dec < 0.0 { '-' } else { '+' };
    // integer tenths of an arcsecond
    let tenths = (dec.abs() * 36_000.0).round() as u64;
    let degrees = tenths / 36_000;
    let minutes = (tenths % 36_000) / 600;
    let seconds = (tenths % 600) as f64 / 10.0;
    format!("{sign}{degrees:02} {minutes:02} {seconds:04.1}")
}
