use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Starting (and reset) cash balance of the simulated ledger.
pub const DEFAULT_CAPITAL: f64 = 100_000.0;

/// Fixed simulated lot size: every buy acquires exactly this many shares.
pub const LOT_SIZE: u32 = 10;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeType::Buy => write!(f, "BUY"),
            TradeType::Sell => write!(f, "SELL"),
        }
    }
}

/// An open position: at most one per ticker.
///
/// `average_price` is the quantity-weighted mean purchase price of all
/// unclosed buy lots (the cost basis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub ticker: String,
    pub average_price: f64,
    pub amount: u32,
}

/// One entry in the append-only trade history.
///
/// Immutable once created, except that a Sell record may later receive its
/// AI critique — located by `id`, never by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: Uuid,
    pub ticker: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub price: f64,
    pub amount: u32,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

impl TradeRecord {
    pub fn new(
        ticker: impl Into<String>,
        trade_type: TradeType,
        price: f64,
        amount: u32,
        timestamp: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.into(),
            trade_type,
            price,
            amount,
            timestamp,
            ai_analysis: None,
        }
    }
}

/// The whole persisted ledger: cash, open positions and trade history
/// (newest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioState {
    pub balance: f64,
    pub initial_balance: f64,
    pub positions: Vec<Position>,
    pub history: Vec<TradeRecord>,

    /// Bumped on every reset. A deferred sell annotation carries the
    /// generation it was created under and is discarded once it mismatches.
    #[serde(default)]
    pub generation: u64,
}

impl Default for PortfolioState {
    fn default() -> Self {
        Self {
            balance: DEFAULT_CAPITAL,
            initial_balance: DEFAULT_CAPITAL,
            positions: Vec::new(),
            history: Vec::new(),
            generation: 0,
        }
    }
}

impl PortfolioState {
    /// The open position for `ticker`, if any.
    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.ticker == ticker)
    }
}
