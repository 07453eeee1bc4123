//! Background cache eviction
//!
//! Runs the exact-cache eviction pass on a fixed interval so memory stays
//! bounded even without traffic. The task is owned by the server lifecycle
//! and stops when its cancellation token fires; client disconnects never
//! touch it.

use sluice_cache::TtlCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawn the periodic eviction task
pub fn spawn(
    cache: Arc<TtlCache<String>>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Cache sweeper started");
        loop {
            tokio::select! {
                () = token.cancelled() => {
                    info!("Cache sweeper stopped");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    cache.evict();
                    debug!(size = cache.len(), "Scheduled cache sweep complete");
                }
            }
        }
    })
}
