//! Error types for cartoframe.
//!
//! This module defines a single error enum covering every failure the
//! loader, the CRS layer and the renderer can raise. Nothing is retried;
//! errors bubble up to the caller.

use thiserror::Error;

/// The main error type for cartoframe operations.
#[derive(Error, Debug)]
pub enum CartoError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON parsing or conversion errors
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Shapefile reading errors
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// Image encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The dataset identifier did not resolve to a readable vector dataset
    #[error("Dataset not found: {name}")]
    DatasetNotFound { name: String },

    /// Unrecognised or malformed CRS definition
    #[error("Invalid CRS '{input}': {message}")]
    InvalidCrs { input: String, message: String },

    /// Coordinate transformation errors
    #[error("Projection error: {message}")]
    Projection { message: String },

    /// A named attribute column is missing
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    /// Two sequences that must be aligned row-for-row are not
    #[error("Length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Figure rendering errors
    #[error("Render error: {message}")]
    Render { message: String },
}

impl CartoError {
    pub(crate) fn invalid_crs(input: impl Into<String>, message: impl Into<String>) -> Self {
        CartoError::InvalidCrs {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with CartoError
pub type Result<T> = std::result::Result<T, CartoError>;
