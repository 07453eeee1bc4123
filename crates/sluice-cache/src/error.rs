//! Error types for sluice-cache

use thiserror::Error;

/// Cache error type
#[derive(Debug, Error)]
pub enum Error {
    /// The embedding backend failed; semantic lookups degrade to misses
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] sluice_llm::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
