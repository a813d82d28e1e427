//! Per-entity debounce of state publishes.
//!
//! Bursts of updates for one entity collapse into a single publish of the
//! most recent value after a quiet period (trailing-edge debounce). Each
//! scheduled publish carries its topic and payload by value, so superseding
//! an update is just aborting its timer task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::mqtt::MqttPublisher;

/// A pending state publish, captured by value at schedule time.
#[derive(Debug, Clone)]
pub struct StatePublish {
    /// Destination topic.
    pub topic: String,

    /// Rendered state payload.
    pub payload: String,
}

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Trailing-edge, per-key debounce over tokio timers.
///
/// At most one timer is pending per key; a new [`schedule`] call for the
/// same key aborts and replaces it. Timers for different keys are
/// independent. The pending-timer table is shared between the router task
/// (insert/replace) and the expiring timers (generation-checked removal).
///
/// [`schedule`]: DebounceScheduler::schedule
pub struct DebounceScheduler {
    delay: Duration,
    publisher: Arc<dyn MqttPublisher>,
    pending: Arc<DashMap<String, PendingTimer>>,
    generation: AtomicU64,
}

impl DebounceScheduler {
    /// Create a scheduler that publishes through `publisher` after `delay`
    /// of quiet per key.
    pub fn new(delay: Duration, publisher: Arc<dyn MqttPublisher>) -> Self {
        Self {
            delay,
            publisher,
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Schedule `publish` for `key`, superseding any pending publish for the
    /// same key.
    ///
    /// The publish runs exactly once, `delay` after the last `schedule` call
    /// for the key; a superseded publish never runs.
    pub fn schedule(&self, key: &str, publish: StatePublish) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let publisher = self.publisher.clone();
        let pending = self.pending.clone();
        let key = key.to_string();

        let handle = tokio::spawn({
            let key = key.clone();
            async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = publisher
                    .publish(&publish.topic, publish.payload.into_bytes(), false)
                    .await
                {
                    warn!(topic = %publish.topic, "state publish failed: {}", e);
                }
                // Clear our own slot, unless a newer timer replaced it while
                // we were firing.
                pending.remove_if(&key, |_, timer| timer.generation == generation);
            }
        });

        if let Some(previous) = self.pending.insert(key, PendingTimer { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Number of keys with a pending publish.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
