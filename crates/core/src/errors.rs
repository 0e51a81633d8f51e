use thiserror::Error;

/// Unified error type for the entire finsight-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage quota exceeded")]
    StorageQuotaExceeded,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Provider ────────────────────────────────────────────────────
    #[error("Provider error: {0}")]
    Provider(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Insufficient balance: cost {cost:.2} exceeds balance {balance:.2}")]
    InsufficientBalance { cost: f64, balance: f64 },

    #[error("No open position for ticker: {0}")]
    PositionNotFound(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
