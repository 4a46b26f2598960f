//! Two-tier cache for search results.
//!
//! The fast tier is an in-process [`moka`] cache bounded to
//! [`MAX_MEMORY_ENTRIES`] result sets with a short TTL (5 minutes by
//! default). The durable tier is a [`DurableStore`] holding JSON entries
//! with a long TTL (24 hours by default) for offline-style reuse across
//! restarts.
//!
//! Reads check the fast tier first. On a miss the durable tier is checked
//! and a valid durable entry is promoted back into the fast tier. Every
//! durable-tier failure is logged and treated as "no entry"; the fast tier
//! stays authoritative for the lifetime of the process.

pub mod clock;
pub mod durable;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::types::MatchRecord;

pub use clock::{Clock, ManualClock, SystemClock};
pub use durable::{DurableStore, FileStore, MemoryStore, StoreError};

/// Maximum number of cached result sets held in memory.
pub const MAX_MEMORY_ENTRIES: u64 = 100;

/// Namespace prefix of engine-owned keys in the durable store.
pub const DURABLE_KEY_PREFIX: &str = "company_search_";

/// A cached value with its creation time and lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    pub data: V,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Lifetime in milliseconds.
    pub ttl: i64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now_millis: i64) -> bool {
        now_millis.saturating_sub(self.created_at) > self.ttl
    }
}

/// Entry counts per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub memory_entries: u64,
    pub durable_entries: usize,
}

/// The search result cache.
pub type ResultCache = TieredCache<Vec<MatchRecord>>;

/// Fast in-memory tier in front of a durable store.
///
/// Construct once at start-up and share by reference (or `Arc`).
pub struct TieredCache<V> {
    memory: Cache<String, CacheEntry<V>>,
    durable: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    memory_ttl: Duration,
    durable_ttl: Duration,
}

impl<V> TieredCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        durable: Arc<dyn DurableStore>,
        clock: Arc<dyn Clock>,
        memory_ttl: Duration,
        durable_ttl: Duration,
    ) -> Self {
        Self {
            memory: Cache::builder().max_capacity(MAX_MEMORY_ENTRIES).build(),
            durable,
            clock,
            memory_ttl,
            durable_ttl,
        }
    }

    /// Cache using the TTLs of `config` and the system clock.
    pub fn from_config(durable: Arc<dyn DurableStore>, config: &SearchConfig) -> Self {
        Self::new(
            durable,
            Arc::new(SystemClock),
            config.memory_ttl(),
            config.durable_ttl(),
        )
    }

    /// Look up `key`, fast tier first, then the durable tier.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();

        if let Some(entry) = self.memory.get(key).await {
            if !entry.is_expired(now) {
                tracing::trace!(key, "memory cache hit");
                return Some(entry.data);
            }
            self.memory.invalidate(key).await;
        }

        let entry = self.read_durable(key)?;
        if entry.is_expired(now) {
            self.remove_durable(key);
            return None;
        }

        tracing::trace!(key, "durable cache hit, promoting");
        let data = entry.data.clone();
        self.memory.insert(key.to_owned(), entry).await;
        Some(data)
    }

    /// Store `data` in both tiers.
    ///
    /// The fast tier uses `ttl`, or the configured memory TTL when `None`;
    /// the durable tier always uses the durable TTL. A durable write
    /// failure is logged and otherwise ignored.
    pub async fn set(&self, key: &str, data: V, ttl: Option<Duration>) {
        let now = self.clock.now_millis();
        let memory_entry = CacheEntry {
            data,
            created_at: now,
            ttl: duration_millis(ttl.unwrap_or(self.memory_ttl)),
        };

        let durable_entry = CacheEntry {
            data: &memory_entry.data,
            created_at: now,
            ttl: duration_millis(self.durable_ttl),
        };
        match serde_json::to_string(&durable_entry) {
            Ok(json) => {
                if let Err(err) = self.durable.set(&durable_key(key), &json) {
                    tracing::warn!(error = %err, "cache write error");
                }
            }
            Err(err) => tracing::warn!(error = %err, "cache encode error"),
        }

        self.memory.insert(key.to_owned(), memory_entry).await;
    }

    /// Remove `key` from both tiers.
    pub async fn invalidate(&self, key: &str) {
        self.memory.invalidate(key).await;
        self.remove_durable(key);
        tracing::debug!(key, "invalidated cache entry");
    }

    /// Remove every entry from the fast tier and every engine-owned entry
    /// from the durable tier. Foreign durable keys are left untouched.
    pub async fn clear(&self) {
        self.memory.invalidate_all();
        self.memory.run_pending_tasks().await;

        match self.durable.keys() {
            Ok(keys) => {
                for key in keys.iter().filter(|k| k.starts_with(DURABLE_KEY_PREFIX)) {
                    if let Err(err) = self.durable.remove(key) {
                        tracing::warn!(error = %err, "cache clear error");
                    }
                }
            }
            Err(err) => tracing::warn!(error = %err, "cache clear error"),
        }
        tracing::debug!("cleared all cache entries");
    }

    /// Entry counts per tier. Durable failures count as zero entries.
    pub async fn stats(&self) -> CacheStats {
        self.memory.run_pending_tasks().await;
        let durable_entries = match self.durable.keys() {
            Ok(keys) => keys
                .iter()
                .filter(|k| k.starts_with(DURABLE_KEY_PREFIX))
                .count(),
            Err(err) => {
                tracing::warn!(error = %err, "cache stats error");
                0
            }
        };
        CacheStats {
            memory_entries: self.memory.entry_count(),
            durable_entries,
        }
    }

    fn read_durable(&self, key: &str) -> Option<CacheEntry<V>> {
        let raw = match self.durable.get(&durable_key(key)) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "cache read error");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable cache entry");
                self.remove_durable(key);
                None
            }
        }
    }

    fn remove_durable(&self, key: &str) {
        if let Err(err) = self.durable.remove(&durable_key(key)) {
            tracing::warn!(error = %err, "cache invalidate error");
        }
    }
}

fn durable_key(key: &str) -> String {
    format!("{DURABLE_KEY_PREFIX}{key}")
}

fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
