use async_trait::async_trait;

use crate::errors::CoreError;

/// The opaque AI collaborator behind the dashboard ("Market Intelligence
/// Provider").
///
/// Dashboard data fetches go through [`crate::services::cache_service::SmartCache`]
/// with caller-supplied producers; this trait covers the one call the core
/// issues itself — the natural-language critique attached to a closed trade.
#[async_trait]
pub trait MarketIntelligence: Send + Sync {
    /// Critique a completed round trip: acquired at `buy_price`, closed at
    /// `sell_price`.
    async fn trade_feedback(
        &self,
        ticker: &str,
        buy_price: f64,
        sell_price: f64,
    ) -> Result<String, CoreError>;
}
