use crate::errors::CoreError;
use crate::storage::traits::KeyValueStore;

/// Storage key for the serialized watchlist.
pub const WATCHLIST_KEY: &str = "fin_watchlist";

fn default_tickers() -> Vec<String> {
    vec!["AAPL".into(), "TSLA".into(), "NVDA".into()]
}

/// Ordered, deduplicated list of watched tickers.
pub struct Watchlist {
    tickers: Vec<String>,
}

impl Watchlist {
    /// Load from the store. Missing or corrupted JSON yields the seeded
    /// default list.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let tickers = store
            .get(WATCHLIST_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(default_tickers);
        Self { tickers }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Add a ticker (trimmed, uppercased). Returns `false` for empty input or
    /// a ticker already present.
    pub fn add(&mut self, store: &mut dyn KeyValueStore, ticker: &str) -> Result<bool, CoreError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() || self.tickers.contains(&ticker) {
            return Ok(false);
        }
        self.tickers.push(ticker);
        self.persist(store)?;
        Ok(true)
    }

    /// Remove a ticker. Returns whether it was present.
    pub fn remove(
        &mut self,
        store: &mut dyn KeyValueStore,
        ticker: &str,
    ) -> Result<bool, CoreError> {
        let before = self.tickers.len();
        self.tickers.retain(|t| t != ticker);
        if self.tickers.len() == before {
            return Ok(false);
        }
        self.persist(store)?;
        Ok(true)
    }

    fn persist(&self, store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        let json = serde_json::to_string(&self.tickers)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        store.set(WATCHLIST_KEY, &json)
    }
}
