//! Sluice Cache - two-tier response memoization
//!
//! This crate provides both cache layers of the gateway:
//! - TTL: bounded exact-match cache with per-intent expiry and LFU eviction
//! - Key: deterministic request digests (sha256)
//! - Semantic: similarity-keyed cache over query embeddings

#![forbid(unsafe_code)]

pub mod error;
pub mod key;
pub mod semantic;
pub mod ttl;

pub use error::{Error, Result};
pub use key::cache_key;
pub use semantic::{SemanticCache, SemanticEntry, DEFAULT_THRESHOLD};
pub use ttl::{CacheStats, TtlCache};
