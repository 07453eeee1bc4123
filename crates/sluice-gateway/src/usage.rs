//! Usage tracking
//!
//! In-memory record of every served request for cost monitoring. Bounded to
//! a fixed number of recent records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Maximum records kept in memory by default
const DEFAULT_MAX_RECORDS: usize = 10_000;

/// One served request
#[derive(Debug, Clone, Serialize)]
pub struct UsageRecord {
    /// Request id, shared with the request's log span
    pub request_id: Uuid,
    /// Completion time
    pub timestamp: DateTime<Utc>,
    /// Model tag that answered (`"cache"` / `"SemanticCache"` included)
    pub model: String,
    /// Classified intent, when known
    pub intent: Option<String>,
    /// Estimated cost in USD
    pub cost: f64,
    /// Latency in milliseconds
    pub latency_ms: u64,
    /// Whether a cache tier served the response
    pub served_from_cache: bool,
}

/// Aggregate usage statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageStats {
    /// Requests served
    pub total_requests: u64,
    /// Requests served by either cache tier
    pub cache_hits: u64,
    /// Total estimated cost in USD
    pub total_cost: f64,
    /// Mean latency in milliseconds
    pub avg_latency_ms: f64,
    /// Request count per model tag
    pub by_model: HashMap<String, u64>,
}

/// Tracks served requests
pub struct UsageTracker {
    records: RwLock<Vec<UsageRecord>>,
    max_records: usize,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    /// Create a tracker with the default record bound
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_records: DEFAULT_MAX_RECORDS,
        }
    }

    /// Override the record bound
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Record one served request, trimming the oldest on overflow
    pub async fn record(&self, record: UsageRecord) {
        let mut records = self.records.write().await;
        records.push(record);
        if records.len() > self.max_records {
            let drain_count = records.len() - self.max_records;
            records.drain(0..drain_count);
        }
    }

    /// Aggregate statistics over the retained records
    pub async fn stats(&self) -> UsageStats {
        let records = self.records.read().await;
        let mut stats = UsageStats::default();

        for record in records.iter() {
            stats.total_requests += 1;
            if record.served_from_cache {
                stats.cache_hits += 1;
            }
            stats.total_cost += record.cost;
            *stats.by_model.entry(record.model.clone()).or_insert(0) += 1;
        }

        if !records.is_empty() {
            let total_latency: u64 = records.iter().map(|r| r.latency_ms).sum();
            stats.avg_latency_ms = total_latency as f64 / records.len() as f64;
        }

        stats
    }

    /// Most recent records, newest last
    pub async fn recent(&self, limit: usize) -> Vec<UsageRecord> {
        let records = self.records.read().await;
        let start = records.len().saturating_sub(limit);
        records[start..].to_vec()
    }
}
