//! Error types for the feature encoder.

use std::path::PathBuf;

use thiserror::Error;

/// Feature encoder error types.
#[derive(Error, Debug)]
pub enum EncoderError {
    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Model metadata file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Seed table has the wrong shape
    #[error("invalid seed table: {0}")]
    InvalidSeedTable(String),

    /// Encoder configuration rejected by validation
    #[error("invalid encoder config: {0}")]
    InvalidConfig(String),

    /// Feature-space width must be positive
    #[error("invalid feature count: {0}")]
    InvalidFeatureCount(usize),

    /// A namespace the encoder needs is absent from the seed table
    #[error("seed table has no entry for namespace '{0}'")]
    MissingNamespace(String),

    /// Encode requested for a namespace the seed table does not know
    #[error("unknown namespace '{0}'")]
    UnknownNamespace(String),

    /// Noise must lie in [0, 1]
    #[error("noise must be within [0, 1], got {0}")]
    InvalidNoise(f64),

    /// A leaf that cannot be turned into a feature
    #[error("unsupported value at '{path}': {reason}")]
    UnsupportedValue { path: String, reason: String },

    /// Invalid vector dimensions
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Result type alias for encoder operations.
pub type Result<T> = std::result::Result<T, EncoderError>;
