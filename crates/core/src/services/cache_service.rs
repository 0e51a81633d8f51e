use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::cache::{CacheEntry, Fetched, TtlClass};
use crate::storage::traits::KeyValueStore;

/// TTL result cache over the key-value store, throttling calls to the slow,
/// rate-limited Market Intelligence Provider.
///
/// The namespace carries the cache schema version (e.g. `fins_v26`). Bumping
/// it moves every entry into a fresh key space, which invalidates all prior
/// entries without touching them. It is constructor configuration, never a
/// global, so each test gets an isolated instance.
pub struct SmartCache {
    namespace: String,
    evictions: u64,
}

impl SmartCache {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            evictions: 0,
        }
    }

    /// How many times the whole store was dropped to recover from quota
    /// exhaustion. A climbing counter means cache thrash.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Fetch through the cache.
    ///
    /// A fresh entry (for `Weekly`/`Hourly`) is returned without invoking the
    /// producer. Otherwise the producer runs; its failures propagate to the
    /// caller unmodified and nothing is written. A successful result is
    /// persisted best-effort — durability is advisory, the data is returned
    /// to the caller either way.
    pub async fn fetch<T, F, Fut>(
        &mut self,
        store: &mut dyn KeyValueStore,
        key: &str,
        ttl: TtlClass,
        now_ms: i64,
        producer: F,
    ) -> Result<Fetched<T>, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let storage_key = self.storage_key(key);

        if ttl != TtlClass::None {
            if let Some(raw) = store.get(&storage_key) {
                // Corrupted entries count as absent.
                if let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) {
                    if entry.is_fresh(ttl, now_ms) {
                        if let Ok(data) = serde_json::from_value::<T>(entry.data) {
                            return Ok(Fetched {
                                data,
                                timestamp: entry.timestamp,
                            });
                        }
                    }
                }
            }
        }

        let data = producer().await?;
        self.persist(store, &storage_key, &data, now_ms);
        Ok(Fetched {
            data,
            timestamp: now_ms,
        })
    }

    /// Best-effort write. On quota exhaustion the entire store is evicted and
    /// the write retried once; a second failure is swallowed.
    fn persist<T: Serialize>(
        &mut self,
        store: &mut dyn KeyValueStore,
        storage_key: &str,
        data: &T,
        now_ms: i64,
    ) {
        let entry = match serde_json::to_value(data) {
            Ok(value) => CacheEntry {
                data: value,
                timestamp: now_ms,
            },
            Err(_) => return,
        };
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(_) => return,
        };

        match store.set(storage_key, &json) {
            Ok(()) => {}
            Err(CoreError::StorageQuotaExceeded) => {
                self.evictions += 1;
                tracing::warn!(
                    key = storage_key,
                    evictions = self.evictions,
                    "store full — clearing everything and retrying the write"
                );
                store.clear();
                let _ = store.set(storage_key, &json);
            }
            Err(_) => {}
        }
    }
}

/// Build a collision-free semantic key from subject, locale and parameter
/// segments, e.g. `semantic_key(&["eco_stats", "Japan", "en"])`.
pub fn semantic_key(parts: &[&str]) -> String {
    parts.join("_")
}
