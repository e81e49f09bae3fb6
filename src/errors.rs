use thiserror::Error;

/// Error taxonomy of the planning pipeline.
///
/// `Configuration` and `CatalogUnavailable` are fatal and abort the run before
/// any further work. `EphemerisRequest` is transient: it is absorbed inside the
/// ephemeris client by the retry loop and only ever surfaces in aggregate as a
/// count of dropped candidates.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Ephemeris request failed: {0}")]
    EphemerisRequest(String),

    #[error("Invalid time value: {0}")]
    InvalidTime(String),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),
}
