use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cache lifetime class for provider responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Slow-moving data (sector profiles, company deep dives): 7 days.
    Weekly,
    /// Fast-moving data (news, macro events): 1 hour.
    Hourly,
    /// Bypass — always refetch. The result is still written so that
    /// subsequent TTL'd readers of the same key can use it.
    None,
}

impl TtlClass {
    pub const WEEKLY_MS: i64 = 7 * 24 * 3_600_000;
    pub const HOURLY_MS: i64 = 3_600_000;

    /// Freshness window in milliseconds; `None` for the bypass class.
    pub fn duration_ms(&self) -> Option<i64> {
        match self {
            TtlClass::Weekly => Some(Self::WEEKLY_MS),
            TtlClass::Hourly => Some(Self::HOURLY_MS),
            TtlClass::None => None,
        }
    }
}

/// Persisted form of one cached provider response.
///
/// Never partially written: the entry is serialized in full before the single
/// store write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub timestamp: i64,
}

impl CacheEntry {
    /// An entry is fresh iff `now - timestamp < duration`. Bypass entries are
    /// never fresh.
    pub fn is_fresh(&self, ttl: TtlClass, now_ms: i64) -> bool {
        match ttl.duration_ms() {
            Some(duration) => now_ms - self.timestamp < duration,
            None => false,
        }
    }
}

/// What a cache fetch hands back: the payload plus the moment it was produced
/// (or originally cached, on a hit).
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub timestamp: i64,
}
