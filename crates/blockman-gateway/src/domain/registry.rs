//! ABI registry - uploaded ABIs kept in memory with usage timestamps.
//!
//! Entries are evicted once they have gone unused for longer than the
//! configured max age. A background task (`cleanup_task`) sweeps at half that
//! interval.

use crate::domain::abi_id::AbiId;
use crate::domain::config::CleanupConfig;
use crate::ports::outbound::{SystemTimeSource, TimeSource};
use alloy_core::json_abi::JsonAbi;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// A stored ABI with metadata
#[derive(Debug, Clone)]
pub struct AbiRecord {
    /// Parsed ABI
    pub abi: Arc<JsonAbi>,
    /// Upload time
    pub created_at: DateTime<Utc>,
    /// Last lookup through `get`
    pub last_used: DateTime<Utc>,
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("ABI not found: {0}")]
    NotFound(AbiId),
}

/// In-memory ABI store.
///
/// Lookups take the shared lock; touching `last_used` re-acquires the
/// exclusive lock and only writes if the entry is still present, so a lookup
/// racing a delete never brings the entry back.
pub struct AbiRegistry {
    entries: RwLock<HashMap<AbiId, AbiRecord>>,
    clock: Arc<dyn TimeSource>,
}

impl AbiRegistry {
    /// Create an empty registry on the system clock
    pub fn new() -> Self {
        Self::with_time_source(Arc::new(SystemTimeSource))
    }

    /// Create an empty registry on the given clock
    pub fn with_time_source(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Store an ABI and return its id
    pub fn save(&self, abi: JsonAbi) -> AbiId {
        let id = AbiId::new();
        let now = self.clock.now();

        let record = AbiRecord {
            abi: Arc::new(abi),
            created_at: now,
            last_used: now,
        };

        self.entries.write().insert(id, record);
        debug!(abi_id = %id, "Stored ABI");

        id
    }

    /// Look up an ABI and mark it as used
    pub fn get(&self, id: &AbiId) -> Option<Arc<JsonAbi>> {
        let abi = {
            let entries = self.entries.read();
            Arc::clone(&entries.get(id)?.abi)
        };

        // Entry may have been removed between the two locks
        let mut entries = self.entries.write();
        if let Some(record) = entries.get_mut(id) {
            record.last_used = self.clock.now();
        }

        Some(abi)
    }

    /// Look up a record without touching it
    pub fn record(&self, id: &AbiId) -> Option<AbiRecord> {
        self.entries.read().get(id).cloned()
    }

    /// Snapshot of every stored ABI, oldest upload first
    pub fn list(&self) -> Vec<(AbiId, AbiRecord)> {
        let mut snapshot: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(id, record)| (*id, record.clone()))
            .collect();

        snapshot.sort_by(|(id_a, a), (id_b, b)| {
            a.created_at.cmp(&b.created_at).then_with(|| id_a.cmp(id_b))
        });
        snapshot
    }

    /// Delete an ABI
    pub fn remove(&self, id: &AbiId) -> Result<(), RegistryError> {
        match self.entries.write().remove(id) {
            Some(_) => {
                debug!(abi_id = %id, "Removed ABI");
                Ok(())
            }
            None => Err(RegistryError::NotFound(*id)),
        }
    }

    /// Evict entries unused for longer than `max_age`.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_older_than(&self, max_age: Duration) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();

        entries.retain(|id, record| {
            let idle = now
                .signed_duration_since(record.last_used)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if idle > max_age {
                debug!(abi_id = %id, idle_secs = idle.as_secs(), "Evicting unused ABI");
                false
            } else {
                true
            }
        });

        before - entries.len()
    }

    /// Number of stored ABIs
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for AbiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task evicting unused ABIs every `max_age / 2`.
///
/// Runs until `shutdown` turns `true` or its sender is dropped. `on_evict` is
/// called with the count of every non-empty sweep.
pub async fn cleanup_task<F>(
    registry: Arc<AbiRegistry>,
    cleanup: CleanupConfig,
    mut shutdown: watch::Receiver<bool>,
    on_evict: F,
) where
    F: Fn(usize) + Send,
{
    let max_age = cleanup.max_age;
    let period = cleanup.sweep_interval();
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(
        max_age_secs = max_age.as_secs(),
        period_ms = period.as_millis() as u64,
        "ABI cleanup task started"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = registry.cleanup_older_than(max_age);
                if removed > 0 {
                    info!(removed = removed, "Cleaned up unused ABIs");
                    on_evict(removed);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    debug!("ABI cleanup task stopped");
}
