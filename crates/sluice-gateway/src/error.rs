//! Error types for sluice-gateway

use thiserror::Error;

/// Gateway request error
#[derive(Debug, Error)]
pub enum Error {
    /// The query was empty after trimming
    #[error("query must not be empty")]
    EmptyQuery,

    /// Selection failed (empty or fully-unhealthy candidate pool)
    #[error(transparent)]
    Selection(#[from] sluice_router::Error),

    /// Every candidate in the attempt chain failed.
    ///
    /// Carries the attempted model names for diagnosis; provider error
    /// bodies are deliberately not included.
    #[error("all candidates exhausted after attempting: {}", attempted.join(", "))]
    AllCandidatesExhausted {
        /// Models tried, in attempt order
        attempted: Vec<String>,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
