//! Sluice Gateway - request orchestration
//!
//! Composes intent classification, candidate selection, provider invocation
//! with fallback, and two cache tiers into one request pipeline:
//! - Orchestrator: the per-request lifecycle and admin surface
//! - Types: request/response DTOs
//! - Usage: per-request cost/latency records
//! - Sweeper: periodic exact-cache eviction task

#![forbid(unsafe_code)]

pub mod error;
pub mod orchestrator;
pub mod sweeper;
pub mod types;
pub mod usage;

pub use error::{Error, Result};
pub use orchestrator::{Gateway, GatewayConfig};
pub use types::{ChatRequest, ChatResponse, RouteReport};
pub use usage::{UsageRecord, UsageStats, UsageTracker};
