//! Error types for the chart store and wheel geometry

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was empty; nothing was written
    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Reasons a chart payload cannot be laid out as a wheel.
///
/// The renderer absorbs these and paints the placeholder instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("canvas {width}x{height} is too small for a chart wheel")]
    CanvasTooSmall { width: f64, height: f64 },

    #[error("chart has {0} house cusps, at most 12 are allowed")]
    TooManyCusps(usize),

    #[error("house {house} cusp is not a finite longitude")]
    InvalidCusp { house: usize },

    #[error("{planet} longitude is not finite")]
    InvalidLongitude { planet: String },
}
