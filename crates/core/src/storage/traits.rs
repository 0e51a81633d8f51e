use crate::errors::CoreError;

/// String-keyed durable store capability (browser storage or equivalent).
///
/// Keys are opaque ASCII strings, values serialized JSON. `set` reports quota
/// exhaustion as `CoreError::StorageQuotaExceeded`; each caller decides
/// whether that is fatal. All access is single-threaded, so read-modify-write
/// sequences must not interleave other store writers.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Drop everything. Used for wholesale eviction on quota exhaustion.
    fn clear(&mut self);
}
