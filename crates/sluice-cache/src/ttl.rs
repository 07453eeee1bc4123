//! Exact-match TTL cache
//!
//! Bounded key→value store with per-entry expiry, least-frequently-used
//! eviction, and hit/miss statistics. All operations take one short
//! exclusive lock; nothing suspends while holding it, so the cache is safe
//! to call from async context.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Entries removed per eviction pass once expired entries are gone
const DEFAULT_EVICT_BATCH: usize = 100;

/// Entries expiring within this window count as "near expiry" in stats
const NEAR_EXPIRY_WINDOW: Duration = Duration::from_secs(300);

/// Per-intent TTL policy.
///
/// `Some(ZERO)` means "do not cache"; `None` means the intent is unknown and
/// the cache default applies.
fn intent_ttl(intent: &str) -> Option<Duration> {
    match intent {
        "code" => Some(Duration::from_secs(24 * 3600)),
        "general" => Some(Duration::from_secs(3600)),
        "chinese" => Some(Duration::from_secs(1800)),
        "medical" => Some(Duration::ZERO),
        "emergency" => Some(Duration::ZERO),
        "math" => Some(Duration::from_secs(12 * 3600)),
        _ => None,
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    expires_at: Instant,
    access_count: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Live entry count (including not-yet-collected expired entries)
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Lookup hits since start
    pub hits: u64,
    /// Lookup misses since start
    pub misses: u64,
    /// hits / (hits + misses), 0.0 when nothing was looked up
    pub hit_rate: f64,
    /// Non-expired entries expiring within the near-expiry window
    pub near_expiry: usize,
}

/// Bounded TTL cache with LFU eviction
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    max_size: usize,
    default_ttl: Duration,
    evict_batch: usize,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given capacity and default TTL
    #[must_use]
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            max_size,
            default_ttl,
            evict_batch: DEFAULT_EVICT_BATCH,
        }
    }

    /// Override the eviction batch size
    #[must_use]
    pub fn with_evict_batch(mut self, batch: usize) -> Self {
        self.evict_batch = batch;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a key.
    ///
    /// Expired-but-present entries are deleted in place and counted as a
    /// miss; hits bump the entry's access count.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut guard = self.lock();
        let inner = &mut *guard;

        if let Some(entry) = inner.entries.get_mut(key) {
            if entry.is_expired(now) {
                inner.entries.remove(key);
                inner.misses += 1;
                return None;
            }
            entry.access_count += 1;
            let value = entry.value.clone();
            inner.hits += 1;
            return Some(value);
        }

        inner.misses += 1;
        None
    }

    /// Store a value, evicting first when at or over capacity.
    ///
    /// A zero TTL stores an already-expired entry: the next `get` is a
    /// guaranteed miss.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let mut inner = self.lock();
        if inner.entries.len() >= self.max_size {
            Self::evict_inner(&mut inner, self.max_size, self.evict_batch);
        }

        let now = Instant::now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        inner.entries.insert(
            key.into(),
            CacheEntry {
                value,
                created_at: now,
                expires_at: now + ttl,
                access_count: 0,
            },
        );
    }

    /// Store a value with the intent-dependent TTL policy.
    ///
    /// Intents mapped to a zero TTL (medical, emergency) are not stored at
    /// all; unknown intents use the cache default.
    pub fn set_with_intent_ttl(&self, key: impl Into<String>, value: V, intent: &str) {
        let ttl = intent_ttl(intent).unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            debug!(intent = %intent, "Intent is never cached, skipping store");
            return;
        }
        self.set(key, value, Some(ttl));
    }

    /// Run an eviction pass: drop expired entries, then LFU-trim if still at
    /// or over capacity. Also invoked by the background sweeper.
    pub fn evict(&self) {
        let mut inner = self.lock();
        Self::evict_inner(&mut inner, self.max_size, self.evict_batch);
    }

    fn evict_inner(inner: &mut Inner<V>, max_size: usize, batch: usize) {
        let now = Instant::now();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| !e.is_expired(now));

        if inner.entries.len() >= max_size {
            // Least-frequently-used first, oldest breaking ties
            let mut ranked: Vec<(String, u64, Instant)> = inner
                .entries
                .iter()
                .map(|(k, e)| (k.clone(), e.access_count, e.created_at))
                .collect();
            ranked.sort_by(|a, b| (a.1, a.2).cmp(&(b.1, b.2)));
            for (key, _, _) in ranked.into_iter().take(batch) {
                inner.entries.remove(&key);
            }
        }

        if before != inner.entries.len() {
            debug!(
                removed = before - inner.entries.len(),
                remaining = inner.entries.len(),
                "Cache eviction pass complete"
            );
        }
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        debug!("Cache cleared");
    }

    /// Whether a key is present and not expired. Does not touch counters.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        let now = Instant::now();
        let inner = self.lock();
        inner
            .entries
            .get(key)
            .map(|e| !e.is_expired(now))
            .unwrap_or(false)
    }

    /// Current entry count
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counter snapshot
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let inner = self.lock();

        let total = inner.hits + inner.misses;
        let hit_rate = if total > 0 {
            inner.hits as f64 / total as f64
        } else {
            0.0
        };
        let near_expiry = inner
            .entries
            .values()
            .filter(|e| !e.is_expired(now) && e.expires_at.duration_since(now) < NEAR_EXPIRY_WINDOW)
            .count();

        CacheStats {
            size: inner.entries.len(),
            max_size: self.max_size,
            hits: inner.hits,
            misses: inner.misses,
            hit_rate,
            near_expiry,
        }
    }
}
