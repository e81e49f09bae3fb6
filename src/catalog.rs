//! # Orbital-element catalog loader
//!
//! Obtains the Minor Planet Center bulk orbit file, caches it verbatim on
//! disk, and parses its fixed-column records into [`CatalogEntry`] values.
//!
//! ## Caching invariant
//! -----------------
//! The download is a one-time cost: if the cache file exists it is used as-is,
//! with **no staleness check**. Removing the file manually is the only refresh
//! path. The download streams into a `.part` sibling and is renamed into place
//! only on success, so an interrupted fetch never masquerades as a cache.
//!
//! ## Record format
//! -----------------
//! MPCORB fixed-column export; the columns read here are the ones the planner
//! needs (designation, H, G, inclination, eccentricity, semi-major axis,
//! name). Malformed records are skipped and counted, never fatal: header and
//! separator lines fall out of the same path.

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use tokio::{fs::File, io::AsyncWriteExt};
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::constants::{AstronomicalUnit, Degree, Magnitude, MPCORB_FILE, MPCORB_URL};
use crate::errors::PlannerError;

/// One parsed catalog record, immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// unique catalog key, unpacked from the leading columns
    pub designation: String,
    pub name: Option<String>,
    /// absolute magnitude H
    pub absolute_magnitude: Magnitude,
    /// slope parameter G
    pub slope: f64,
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Degree,
}

/// Check-then-fetch-then-persist loader for the orbital-element catalog.
pub struct CatalogLoader {
    url: String,
    cache_file: Utf8PathBuf,
}

impl CatalogLoader {
    /// Resolve the source URL and cache location from the configuration.
    ///
    /// A configured `catalog_path` short-circuits the platform cache directory;
    /// a configured `catalog_url` overrides the default MPC export.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        let url = config
            .catalog_url
            .clone()
            .unwrap_or_else(|| MPCORB_URL.to_string());

        let cache_file = match &config.catalog_path {
            Some(path) => path.clone(),
            None => {
                let base_dirs = BaseDirs::new().ok_or_else(|| {
                    PlannerError::CatalogUnavailable(
                        "cannot resolve a platform cache directory".into(),
                    )
                })?;
                let cache_dir = Utf8Path::from_path(base_dirs.cache_dir()).ok_or_else(|| {
                    PlannerError::CatalogUnavailable("cache directory is not UTF-8".into())
                })?;
                cache_dir.join("obsplan").join(MPCORB_FILE)
            }
        };

        Ok(CatalogLoader { url, cache_file })
    }

    /// Load the catalog, downloading it first if the cache is absent.
    ///
    /// Return
    /// ------
    /// * All parsable entries, or [`PlannerError::CatalogUnavailable`] when
    ///   neither the cache nor the remote fetch yields a usable file.
    pub async fn load(&self) -> Result<Vec<CatalogEntry>, PlannerError> {
        if !self.cache_file.exists() {
            info!("catalog cache missing, fetching {}", self.url);
            self.fetch_and_persist().await.map_err(|e| {
                PlannerError::CatalogUnavailable(format!("fetch of {} failed: {e}", self.url))
            })?;
        } else {
            debug!("using cached catalog at {}", self.cache_file);
        }

        let content = std::fs::read_to_string(&self.cache_file).map_err(|e| {
            PlannerError::CatalogUnavailable(format!("cannot read {}: {e}", self.cache_file))
        })?;

        let (entries, skipped) = parse_catalog(&content);
        if entries.is_empty() {
            return Err(PlannerError::CatalogUnavailable(format!(
                "no parsable records in {}",
                self.cache_file
            )));
        }

        info!(
            "parsed {} catalog records ({} lines skipped)",
            entries.len(),
            skipped
        );
        Ok(entries)
    }

    async fn fetch_and_persist(&self) -> Result<(), PlannerError> {
        if let Some(parent) = self.cache_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let part_file = self.cache_file.with_extension("part");
        if let Err(e) = download_catalog(&self.url, &part_file).await {
            // don't leave a stale partial next to the cache
            let _ = std::fs::remove_file(&part_file);
            return Err(e);
        }
        std::fs::rename(&part_file, &self.cache_file)?;
        Ok(())
    }
}

/// Stream the catalog file from `url` to `path` in chunks.
async fn download_catalog(url: &str, path: &Utf8Path) -> Result<(), PlannerError> {
    let mut file = File::create(path).await?;
    let mut stream = reqwest::get(url).await?.error_for_status()?.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    info!("downloaded {url}");
    Ok(())
}

/// Parse the whole catalog body, returning entries and the skipped-line count.
///
/// Blank lines are ignored; any other line that fails to parse is counted as
/// skipped.
pub fn parse_catalog(content: &str) -> (Vec<CatalogEntry>, usize) {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(line) {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }

    (entries, skipped)
}

/// MPCORB column ranges (0-based, end exclusive).
const COL_DESIGNATION: std::ops::Range<usize> = 0..7;
const COL_H: std::ops::Range<usize> = 8..13;
const COL_G: std::ops::Range<usize> = 14..19;
const COL_INCLINATION: std::ops::Range<usize> = 59..68;
const COL_ECCENTRICITY: std::ops::Range<usize> = 70..79;
const COL_SEMI_MAJOR: std::ops::Range<usize> = 92..103;
const COL_NAME: std::ops::Range<usize> = 166..194;

fn parse_record(line: &str) -> Option<CatalogEntry> {
    let raw_designation = line.get(COL_DESIGNATION)?.trim();
    if raw_designation.is_empty() {
        return None;
    }
    // numbered designations are zero-padded; provisional ones stay packed
    let trimmed = raw_designation.trim_start_matches('0');
    let designation = if trimmed.is_empty() {
        raw_designation.to_string()
    } else {
        trimmed.to_string()
    };

    let absolute_magnitude: f64 = line.get(COL_H)?.trim().parse().ok()?;
    // G is occasionally blank; the MPC convention defaults it to 0.15
    let slope: f64 = line.get(COL_G)?.trim().parse().unwrap_or(0.15);
    let inclination: f64 = line.get(COL_INCLINATION)?.trim().parse().ok()?;
    let eccentricity: f64 = line.get(COL_ECCENTRICITY)?.trim().parse().ok()?;
    let semi_major_axis: f64 = line.get(COL_SEMI_MAJOR)?.trim().parse().ok()?;

    let name = line
        .get(COL_NAME)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(CatalogEntry {
        designation,
        name,
        absolute_magnitude,
        slope,
        semi_major_axis,
        eccentricity,
        inclination,
    })
}
