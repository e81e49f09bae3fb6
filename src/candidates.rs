//! # Pre-query candidate filter
//!
//! Narrows the parsed catalog to the set worth spending network requests on,
//! using two purely local predicates: a coarse apparent-magnitude estimate
//! derived from the absolute magnitude H, and an orbital-class predicate.
//!
//! The magnitude estimate is deliberately permissive. The true apparent
//! magnitude depends on geometry only known after the ephemeris query, so the
//! estimated range is widened by a fixed margin and an entry is kept whenever
//! that widened range overlaps the configured band. The contract is a superset
//! filter: never reject an entry the visibility evaluator could accept.

use tracing::info;

use crate::catalog::CatalogEntry;
use crate::config::MagnitudeBand;
use crate::constants::{Magnitude, MAIN_BELT_MAX_AU, MAIN_BELT_MAX_ECC, MAIN_BELT_MIN_AU};

/// Widening applied on both sides of the estimated apparent-magnitude range,
/// covering phase effects and the H uncertainty.
const MAG_MARGIN: Magnitude = 2.0;

/// Orbital-class predicate for the main asteroid belt.
pub fn main_belt(entry: &CatalogEntry) -> bool {
    (MAIN_BELT_MIN_AU..=MAIN_BELT_MAX_AU).contains(&entry.semi_major_axis)
        && entry.eccentricity < MAIN_BELT_MAX_ECC
}

/// Coarse `[brightest, faintest]` apparent-magnitude estimate for an entry.
///
/// Brackets the heliocentric distance by the perihelion and aphelion of the
/// orbit, `q = a (1 - e)` and `Q = a (1 + e)`: the geocentric distance ranges
/// from roughly `q - 1 au` at a perihelic opposition to `Q + 1 au` near
/// conjunction, and `m = H + 5 log10(r * delta)` at zero phase. An eccentric
/// orbit can sit well sunward of its semi-major axis, so the bracket must use
/// `q`, not `a`, on the bright side.
fn estimated_magnitude_range(entry: &CatalogEntry) -> (Magnitude, Magnitude) {
    let q = entry.semi_major_axis * (1.0 - entry.eccentricity);
    let big_q = entry.semi_major_axis * (1.0 + entry.eccentricity);
    let delta_min = (q - 1.0).max(0.1);
    let delta_max = big_q + 1.0;

    let brightest = entry.absolute_magnitude + 5.0 * (q * delta_min).log10();
    let faintest = entry.absolute_magnitude + 5.0 * (big_q * delta_max).log10();
    (brightest, faintest)
}

/// Keep the entries whose widened magnitude estimate overlaps `band` and that
/// satisfy `orbit_class`.
///
/// Arguments
/// ---------
/// * `entries`: the full parsed catalog, consumed.
/// * `band`: configured apparent-magnitude acceptance band.
/// * `orbit_class`: cheap orbital predicate, e.g. [`main_belt`].
///
/// Return
/// ------
/// * The surviving entries, ownership transferred to the next stage.
pub fn filter_candidates<P>(
    entries: Vec<CatalogEntry>,
    band: &MagnitudeBand,
    orbit_class: P,
) -> Vec<CatalogEntry>
where
    P: Fn(&CatalogEntry) -> bool,
{
    let considered = entries.len();
    let survivors: Vec<CatalogEntry> = entries
        .into_iter()
        .filter(|entry| {
            if !orbit_class(entry) {
                return false;
            }
            let (brightest, faintest) = estimated_magnitude_range(entry);
            brightest - MAG_MARGIN <= band.max && faintest + MAG_MARGIN >= band.min
        })
        .collect();

    info!(
        "candidate filter kept {} of {} catalog entries",
        survivors.len(),
        considered
    );
    survivors
}

#[cfg(test)]
mod candidates_test {
    use super::*;

    fn entry(h: f64, a: f64, e: f64) -> CatalogEntry {
        CatalogEntry {
            designation: "1".into(),
            name: None,
            absolute_magnitude: h,
            slope: 0.15,
            semi_major_axis: a,
            eccentricity: e,
            inclination: 5.0,
        }
    }

    fn band() -> MagnitudeBand {
        MagnitudeBand { min: 16.0, max: 19.0 }
    }

    #[test]
    fn test_orbit_class_bounds() {
        assert!(main_belt(&entry(15.0, 2.0, 0.1)));
        assert!(main_belt(&entry(15.0, 3.6, 0.1)));
        // near-Earth and outer objects are excluded
        assert!(!main_belt(&entry(15.0, 1.2, 0.1)));
        assert!(!main_belt(&entry(15.0, 5.2, 0.1)));
        assert!(!main_belt(&entry(15.0, 2.7, 0.6)));
    }

    #[test]
    fn test_band_boundary_entries_are_kept() {
        // For a = 2.7 au, e = 0.1 the zero-phase estimate is roughly H + 2.7
        // at a perihelic opposition and H + 5.4 at conjunction. Entries whose
        // true magnitude can sit on either band edge must survive.
        let boundary_faint = entry(15.5, 2.7, 0.1); // ~18.2 to ~20.9 estimated
        let boundary_bright = entry(11.2, 2.7, 0.1); // ~13.9 to ~16.6 estimated
        let kept = filter_candidates(
            vec![boundary_faint.clone(), boundary_bright.clone()],
            &band(),
            main_belt,
        );
        assert_eq!(kept, vec![boundary_faint, boundary_bright]);
    }

    #[test]
    fn test_eccentric_entry_bright_at_perihelion_is_kept() {
        // q = 2.2 * 0.56 = 1.232 au: near a perihelic opposition this object
        // reaches m ~ 16.3, inside the band, even though the circular estimate
        // at a = 2.2 au would put it fainter than 21. The bright-side bracket
        // must come from the perihelion distance.
        let eccentric = entry(19.0, 2.2, 0.44);
        let kept = filter_candidates(vec![eccentric.clone()], &band(), main_belt);
        assert_eq!(kept, vec![eccentric]);
    }

    #[test]
    fn test_hopeless_entries_are_dropped() {
        // far too bright: even the faintest estimate plus margin stays under 16
        let bright = entry(5.0, 2.7, 0.1);
        // far too faint: even the brightest estimate minus margin exceeds 19
        let faint = entry(25.0, 2.7, 0.1);
        let kept = filter_candidates(vec![bright, faint], &band(), main_belt);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_orbit_class_applied_before_magnitude() {
        let neo = entry(17.0, 1.1, 0.3);
        let kept = filter_candidates(vec![neo], &band(), main_belt);
        assert!(kept.is_empty());
    }
}
