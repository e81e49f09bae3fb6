//! # Observation list composition and output
//!
//! Ranks the surviving [`VisibilityRecord`]s into the final nightly list and
//! materializes it twice: a formatted in-memory report for the terminal and a
//! row-per-record CSV artifact. Both are deterministic given identical inputs;
//! the artifact is written once, at the end of a successful run, overwriting
//! any prior file at the same path.

use std::fmt::Write as _;

use camino::Utf8Path;
use hifitime::Epoch;

use crate::conversion::{dec_to_dms, ra_to_hms};
use crate::errors::PlannerError;
use crate::time::{local_hhmm, utc_date};
use crate::visibility::VisibilityRecord;

/// Terminal artifact of a planning run.
#[derive(Debug)]
pub struct ObservationList {
    /// ranked records, at most the configured target count
    pub records: Vec<VisibilityRecord>,
    pub generated_at: Epoch,
}

/// Rank records by ascending transit time, brighter first on equal transit,
/// and truncate to `target_count`.
pub fn compose(
    mut records: Vec<VisibilityRecord>,
    target_count: usize,
    generated_at: Epoch,
) -> ObservationList {
    records.sort_by(|a, b| {
        a.transit
            .to_mjd_utc_days()
            .total_cmp(&b.transit.to_mjd_utc_days())
            .then_with(|| a.magnitude.total_cmp(&b.magnitude))
    });
    records.truncate(target_count);
    ObservationList {
        records,
        generated_at,
    }
}

impl ObservationList {
    /// Formatted report printed on success.
    pub fn formatted_report(&self, utc_offset_hours: f64) -> String {
        let rule = "=".repeat(96);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "FINAL OBSERVING LIST ({} targets)", self.records.len());
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:<10} {:<18} {:<11} {:<12} {:<12} {:>5} {:>6} {:>6}  {:<7}",
            "Object", "Name", "Date", "RA", "DEC", "Mag", "Alt", "Az", "Transit"
        );
        for record in &self.records {
            let _ = writeln!(
                out,
                "{:<10} {:<18} {:<11} {:<12} {:<12} {:>5.2} {:>6.1} {:>6.1}  {:<7}",
                record.designation,
                record.name.as_deref().unwrap_or("-"),
                utc_date(record.transit),
                ra_to_hms(record.ra),
                dec_to_dms(record.dec),
                record.magnitude,
                record.altitude,
                record.azimuth,
                local_hhmm(record.transit, utc_offset_hours),
            );
        }
        if self.records.is_empty() {
            let _ = writeln!(out, "(no visible candidates in the configured window)");
        }
        let _ = writeln!(out, "{rule}");
        out
    }

    /// Write the row-per-record CSV artifact.
    pub fn write_csv(&self, path: &Utf8Path, utc_offset_hours: f64) -> Result<(), PlannerError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "designation",
            "name",
            "date",
            "ra",
            "dec",
            "magnitude",
            "altitude",
            "azimuth",
            "transit_local",
        ])?;
        for record in &self.records {
            writer.write_record([
                record.designation.as_str(),
                record.name.as_deref().unwrap_or(""),
                &utc_date(record.transit),
                &ra_to_hms(record.ra),
                &dec_to_dms(record.dec),
                &format!("{:.2}", record.magnitude),
                &format!("{:.1}", record.altitude),
                &format!("{:.1}", record.azimuth),
                &local_hhmm(record.transit, utc_offset_hours),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod report_test {
    use super::*;

    fn record(designation: &str, hour: u8, magnitude: f64) -> VisibilityRecord {
        VisibilityRecord {
            designation: designation.into(),
            name: None,
            transit: Epoch::from_gregorian_utc(2026, 2, 4, hour, 0, 0, 0),
            ra: 120.0,
            dec: -20.0,
            magnitude,
            altitude: 40.0,
            azimuth: 90.0,
        }
    }

    fn now() -> Epoch {
        Epoch::from_gregorian_utc(2026, 2, 4, 9, 0, 0, 0)
    }

    #[test]
    fn test_truncates_to_target_count() {
        let records = (10..16).map(|h| record("x", h, 17.0)).collect();
        let list = compose(records, 4, now());
        assert_eq!(list.records.len(), 4);

        let list = compose(vec![record("x", 10, 17.0)], 6, now());
        assert_eq!(list.records.len(), 1);
    }

    #[test]
    fn test_sorted_by_transit_then_brightness() {
        let records = vec![
            record("late", 14, 16.0),
            record("early_faint", 11, 18.5),
            record("early_bright", 11, 16.5),
        ];
        let list = compose(records, 6, now());
        let order: Vec<&str> = list
            .records
            .iter()
            .map(|r| r.designation.as_str())
            .collect();
        assert_eq!(order, vec!["early_bright", "early_faint", "late"]);
    }

    #[test]
    fn test_deterministic_given_identical_inputs() {
        let build = || {
            vec![
                record("b", 12, 17.0),
                record("a", 12, 17.0),
                record("c", 11, 17.0),
            ]
        };
        let first = compose(build(), 6, now());
        let second = compose(build(), 6, now());
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn test_csv_artifact_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("targets.csv")).unwrap();

        let list = compose(vec![record("433", 12, 17.25)], 6, now());
        list.write_csv(&path, 10.5).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "designation,name,date,ra,dec,magnitude,altitude,azimuth,transit_local"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("433,,2026-02-04,"));
        assert!(row.contains("17.25"));
        assert!(row.ends_with("22:30"));
    }

    #[test]
    fn test_empty_list_report_mentions_no_candidates() {
        let list = compose(Vec::new(), 6, now());
        assert!(list
            .formatted_report(10.5)
            .contains("no visible candidates"));
    }
}
