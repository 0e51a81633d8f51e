use chrono::Utc;

/// Millisecond wall-clock source.
///
/// Injected rather than read from a global so every cache/cooldown decision
/// can be pinned to a fixed instant in tests.
pub trait Clock {
    /// Current time as Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Real wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
