//! Error types for scatterplot-core
//!
//! Errors are reserved for construction-time precondition failures:
//! - Dataset dimensionality problems
//! - Unsupported dimension counts when building cameras
//! - Point indices that do not exist in the current projection
//! - Invalid configuration
//!
//! Degenerate input (empty point sets, zero-width extents, no legend colorer)
//! is handled with fallback behavior and never reported here.

use thiserror::Error;

/// Main error type for scatter plot operations
#[derive(Error, Debug)]
pub enum ScatterError {
    /// Dataset construction errors
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),

    /// Dimension count other than 2 or 3
    #[error("dimensions must be 2 or 3, got {dimensions}")]
    UnsupportedDimensions { dimensions: usize },

    /// Selected or hovered index outside the projection
    #[error("Point index {index} out of range for {count} points")]
    PointIndexOutOfRange { index: usize, count: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while building a point dataset
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DatasetError {
    /// Points must be 2 or 3 dimensional
    #[error("Points must be 2 or 3 dimensional, got {dimensions}")]
    UnsupportedDimensions { dimensions: usize },

    /// A point disagrees with the dimensionality of the first point
    #[error("Point {index} has {actual} components, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Metadata list does not line up with the points
    #[error("Metadata has {metadata} entries for {points} points")]
    MetadataLength { points: usize, metadata: usize },

    /// Coordinate columns of different lengths
    #[error("Coordinate column has {actual} values, expected {expected}")]
    ColumnLength { expected: usize, actual: usize },
}

/// Errors related to configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is outside its allowed range
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

/// Result type alias for scatter plot operations
pub type ScatterResult<T> = Result<T, ScatterError>;

/// Result type alias for dataset construction
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type alias for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;
