//! Error types for sluice-router

use thiserror::Error;

/// Routing error type
#[derive(Debug, Error)]
pub enum Error {
    /// Selection was asked to pick from an empty candidate pool
    #[error("no candidates available for selection")]
    NoCandidatesAvailable,

    /// Routing config file could not be read
    #[error("failed to read routing config {path}: {source}")]
    ConfigIo {
        /// Path that failed to load
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Routing config file could not be parsed
    #[error("failed to parse routing config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Config references a model that is not declared under `models`
    #[error("routing config references unknown model: {0}")]
    UnknownModel(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
