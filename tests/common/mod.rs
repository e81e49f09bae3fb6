use std::collections::HashMap;

use async_trait::async_trait;
use obsplan::catalog::CatalogEntry;
use obsplan::ephemeris::{EphemerisRequest, EphemerisTransport};
use obsplan::errors::PlannerError;

/// Render a Horizons-like observer-table body with one
/// `(ra, dec, az, alt, mag)` row per requested epoch.
pub fn observer_table(rows: &[(f64, f64, f64, f64, f64)]) -> String {
    let mut body = String::from(
        "*******************************************************************************\n\
         Date__(UT)__HR:MN, , , R.A._(ICRF), DEC_(ICRF), Azi_(a-app), Elev_(a-app), APmag, S-brt,\n\
         $$SOE\n",
    );
    for (ra, dec, az, alt, mag) in rows {
        body.push_str(&format!(
            " 2026-Feb-04 11:30, , ,{ra:>12.6},{dec:>12.6},{az:>12.4},{alt:>12.4},{mag:>8.2},   6.0,\n"
        ));
    }
    body.push_str("$$EOE\n");
    body
}

/// Transport that serves canned responses per designation; unknown
/// designations fail every attempt.
#[derive(Default)]
pub struct ScriptedTransport {
    bodies: HashMap<String, String>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        ScriptedTransport::default()
    }

    pub fn with_target(mut self, designation: &str, rows: &[(f64, f64, f64, f64, f64)]) -> Self {
        self.bodies
            .insert(designation.to_string(), observer_table(rows));
        self
    }
}

#[async_trait]
impl EphemerisTransport for ScriptedTransport {
    async fn fetch(&self, request: &EphemerisRequest) -> Result<String, PlannerError> {
        self.bodies
            .get(&request.designation)
            .cloned()
            .ok_or_else(|| {
                PlannerError::EphemerisRequest(format!("no route to {}", request.designation))
            })
    }
}

/// A plausible main-belt catalog entry for pipeline tests.
pub fn main_belt_entry(designation: &str, name: Option<&str>, h: f64) -> CatalogEntry {
    CatalogEntry {
        designation: designation.to_string(),
        name: name.map(str::to_string),
        absolute_magnitude: h,
        slope: 0.15,
        semi_major_axis: 2.7,
        eccentricity: 0.08,
        inclination: 10.6,
    }
}
