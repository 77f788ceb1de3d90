//! Configuration errors.
//!
//! Everything here is raised at construction or load time. Per-frame code
//! never returns these; it assumes inputs were validated up front.

use thiserror::Error;

/// Result type for catalog/config construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while building orbits, catalogs, paths or config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("orbit period must be positive and finite, got {0}")]
    NonPositivePeriod(f64),

    #[error("eccentricity must lie in [0, 1), got {0}")]
    EccentricityOutOfRange(f64),

    #[error("semi-major axis must be non-negative and finite, got {0}")]
    NegativeSemiMajorAxis(f64),

    #[error("non-finite value for {0}")]
    NonFinite(&'static str),

    #[error("body '{child}' references unknown or later parent '{parent}'")]
    UnknownParent { child: String, parent: String },

    #[error("duplicate id in catalog: {0}")]
    DuplicateId(String),

    #[error("body '{id}' has invalid radius {radius}")]
    InvalidRadius { id: String, radius: f32 },

    #[error("focal body '{0}' is not in the catalog")]
    UnknownFocalBody(String),

    #[error("hub '{id}' has invalid coordinates (lat {latitude}, lon {longitude})")]
    InvalidHubCoordinates { id: String, latitude: f32, longitude: f32 },

    #[error("tunnel path needs at least 2 control points, got {0}")]
    TooFewControlPoints(usize),

    #[error("scene does not support {0}")]
    Unsupported(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
