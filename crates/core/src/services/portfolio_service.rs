use rand::Rng;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::{PortfolioState, Position, TradeRecord, TradeType, LOT_SIZE};
use crate::storage::traits::KeyValueStore;

/// Storage key for the serialized ledger. The version suffix moves the key
/// space whenever the schema changes shape.
pub const PORTFOLIO_KEY: &str = "fin_portfolio_v2";

/// A closed trade plus the ledger generation it happened under, handed to the
/// deferred AI-annotation phase.
#[derive(Debug, Clone)]
pub struct SellOutcome {
    pub record: TradeRecord,
    pub generation: u64,
}

/// The simulated trading ledger: cash balance, weighted-average-cost
/// positions and an append-only, newest-first trade history.
///
/// Every operation loads the latest committed state, computes the full result
/// in memory and commits it in a single write — callers never observe a
/// partially-applied update.
pub struct PortfolioLedger;

impl PortfolioLedger {
    pub fn new() -> Self {
        Self
    }

    /// Load the persisted state. Missing or corrupted JSON yields the default
    /// fresh $100,000 ledger.
    pub fn load(&self, store: &dyn KeyValueStore) -> PortfolioState {
        store
            .get(PORTFOLIO_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn commit(
        &self,
        store: &mut dyn KeyValueStore,
        state: &PortfolioState,
    ) -> Result<(), CoreError> {
        let json = serde_json::to_string(state)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        store.set(PORTFOLIO_KEY, &json)
    }

    /// Set starting capital from raw user input. Non-numeric input is a
    /// silent no-op. Returns the (possibly unchanged) state.
    pub fn set_capital(
        &self,
        store: &mut dyn KeyValueStore,
        input: &str,
    ) -> Result<PortfolioState, CoreError> {
        let mut state = self.load(store);
        if let Ok(value) = input.trim().parse::<f64>() {
            if !value.is_nan() {
                state.balance = value;
                state.initial_balance = value;
                self.commit(store, &state)?;
            }
        }
        Ok(state)
    }

    /// Buy a fixed lot of [`LOT_SIZE`] shares at `price`.
    ///
    /// Rejected with no mutation when the cost exceeds the cash balance.
    /// A repeat buy folds into the existing position's weighted average.
    pub fn buy(
        &self,
        store: &mut dyn KeyValueStore,
        ticker: &str,
        price: f64,
        now_ms: i64,
    ) -> Result<TradeRecord, CoreError> {
        let mut state = self.load(store);
        let cost = price * f64::from(LOT_SIZE);
        if state.balance < cost {
            return Err(CoreError::InsufficientBalance {
                cost,
                balance: state.balance,
            });
        }

        match state.positions.iter_mut().find(|p| p.ticker == ticker) {
            Some(pos) => {
                let merged = f64::from(pos.amount) + f64::from(LOT_SIZE);
                pos.average_price =
                    (pos.average_price * f64::from(pos.amount) + cost) / merged;
                pos.amount += LOT_SIZE;
            }
            None => state.positions.push(Position {
                ticker: ticker.to_string(),
                average_price: price,
                amount: LOT_SIZE,
            }),
        }

        state.balance -= cost;
        let record = TradeRecord::new(ticker, TradeType::Buy, price, LOT_SIZE, now_ms);
        state.history.insert(0, record.clone());
        self.commit(store, &state)?;
        Ok(record)
    }

    /// Close the whole position for `ticker` — there is no partial sell.
    ///
    /// The execution price is synthetic paper-trading pricing, not a live
    /// quote: the cost basis perturbed by a uniform offset in [-5%, +5%).
    /// The Sell record is committed eagerly with no annotation; the critique
    /// arrives later through [`Self::attach_analysis`].
    pub fn sell<R: Rng + ?Sized>(
        &self,
        store: &mut dyn KeyValueStore,
        ticker: &str,
        now_ms: i64,
        rng: &mut R,
    ) -> Result<SellOutcome, CoreError> {
        let mut state = self.load(store);
        let idx = state
            .positions
            .iter()
            .position(|p| p.ticker == ticker)
            .ok_or_else(|| CoreError::PositionNotFound(ticker.to_string()))?;
        let pos = state.positions.remove(idx);

        let market_price = pos.average_price * (1.0 + rng.gen_range(-0.05..0.05));
        state.balance += market_price * f64::from(pos.amount);

        let record =
            TradeRecord::new(pos.ticker, TradeType::Sell, market_price, pos.amount, now_ms);
        state.history.insert(0, record.clone());
        let generation = state.generation;
        self.commit(store, &state)?;
        Ok(SellOutcome { record, generation })
    }

    /// Second phase of a sell: attach the AI critique to the record it
    /// belongs to, located by id — intervening trades may have prepended
    /// newer records. Returns `Ok(false)` and writes nothing when the ledger
    /// was reset in the meantime or the record is gone.
    pub fn attach_analysis(
        &self,
        store: &mut dyn KeyValueStore,
        generation: u64,
        record_id: Uuid,
        analysis: &str,
    ) -> Result<bool, CoreError> {
        let mut state = self.load(store);
        if state.generation != generation {
            tracing::debug!(%record_id, "discarding stale trade annotation after reset");
            return Ok(false);
        }
        let record = match state.history.iter_mut().find(|r| r.id == record_id) {
            Some(record) => record,
            None => return Ok(false),
        };
        record.ai_analysis = Some(analysis.to_string());
        self.commit(store, &state)?;
        Ok(true)
    }

    /// Wipe the ledger back to a fresh $100,000. Irreversible; the generation
    /// bump orphans any in-flight annotations.
    pub fn reset(&self, store: &mut dyn KeyValueStore) -> Result<PortfolioState, CoreError> {
        let previous = self.load(store);
        let state = PortfolioState {
            generation: previous.generation + 1,
            ..PortfolioState::default()
        };
        self.commit(store, &state)?;
        Ok(state)
    }
}

impl Default for PortfolioLedger {
    fn default() -> Self {
        Self::new()
    }
}
