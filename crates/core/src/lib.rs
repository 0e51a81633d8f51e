pub mod clock;
pub mod errors;
pub mod models;
pub mod notify;
pub mod providers;
pub mod services;
pub mod storage;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use clock::{Clock, SystemClock};
use errors::CoreError;
use models::cache::{Fetched, TtlClass};
use models::country::Country;
use models::indicators::TechnicalIndicators;
use models::portfolio::{PortfolioState, TradeRecord};
use models::settings::AlertSettings;
use notify::NotificationSink;
use providers::traits::MarketIntelligence;
use services::alert_service::AlertEvaluator;
use services::cache_service::SmartCache;
use services::country_service::CountryRegistry;
use services::portfolio_service::{PortfolioLedger, SellOutcome};
use services::watchlist_service::Watchlist;
use storage::memory::MemoryStore;
use storage::traits::KeyValueStore;

/// Cache schema version baked into every cache key. Bumping it implicitly
/// invalidates all previously cached provider responses.
pub const DEFAULT_CACHE_NAMESPACE: &str = "fins_v26";

/// Main entry point for the FinSight core library.
///
/// Owns the shared key-value store and the stateful subsystems, and wires the
/// dashboard control flow: provider fetches go through the TTL cache, fetched
/// indicators feed the alert evaluator, trade intents hit the ledger, and
/// country names found in payloads land in the registry.
#[must_use]
pub struct FinSight {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    cache: SmartCache,
    alerts: AlertEvaluator,
    ledger: PortfolioLedger,
    countries: CountryRegistry,
    watchlist: Watchlist,
}

impl FinSight {
    /// Fresh in-memory instance with the default cache namespace.
    pub fn new() -> Self {
        Self::with_store(
            Box::new(MemoryStore::new()),
            Box::new(SystemClock),
            DEFAULT_CACHE_NAMESPACE,
        )
    }

    /// Explicit wiring: any store, any clock, and the cache schema version as
    /// configuration. Fresh instances per test need no globals.
    pub fn with_store(
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        cache_namespace: &str,
    ) -> Self {
        let countries = CountryRegistry::load(store.as_ref());
        let watchlist = Watchlist::load(store.as_ref());
        Self {
            store,
            clock,
            cache: SmartCache::new(cache_namespace),
            alerts: AlertEvaluator::new(),
            ledger: PortfolioLedger::new(),
            countries,
            watchlist,
        }
    }

    // ── Cached provider data ────────────────────────────────────────

    /// Fetch dashboard data through the TTL cache. `producer` reaches the
    /// Market Intelligence Provider on a miss; its failures propagate to the
    /// caller unmodified.
    pub async fn fetch_cached<T, F, Fut>(
        &mut self,
        key: &str,
        ttl: TtlClass,
        producer: F,
    ) -> Result<Fetched<T>, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let now = self.clock.now_ms();
        self.cache
            .fetch(self.store.as_mut(), key, ttl, now, producer)
            .await
    }

    /// Whole-store evictions performed so far to recover from quota
    /// exhaustion.
    #[must_use]
    pub fn cache_evictions(&self) -> u64 {
        self.cache.evictions()
    }

    // ── Alerts ──────────────────────────────────────────────────────

    #[must_use]
    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings::load(self.store.as_ref())
    }

    pub fn save_alert_settings(&mut self, settings: &AlertSettings) -> Result<(), CoreError> {
        settings.save(self.store.as_mut())
    }

    /// Fire-and-forget technical alert check for one symbol, using the
    /// persisted settings.
    pub fn check_alerts(
        &mut self,
        sink: &mut dyn NotificationSink,
        symbol: &str,
        indicators: &TechnicalIndicators,
        current_price: Option<f64>,
    ) {
        let settings = AlertSettings::load(self.store.as_ref());
        let now = self.clock.now_ms();
        self.alerts.check(
            self.store.as_mut(),
            sink,
            symbol,
            indicators,
            &settings,
            current_price,
            now,
        );
    }

    // ── Paper trading ───────────────────────────────────────────────

    /// Current ledger state (corrupted storage loads as a fresh ledger).
    #[must_use]
    pub fn portfolio(&self) -> PortfolioState {
        self.ledger.load(self.store.as_ref())
    }

    /// Set starting capital from raw user input; non-numeric input is a
    /// no-op.
    pub fn set_capital(&mut self, input: &str) -> Result<PortfolioState, CoreError> {
        self.ledger.set_capital(self.store.as_mut(), input)
    }

    /// Buy a fixed simulated lot at `price`.
    pub fn buy(&mut self, ticker: &str, price: f64) -> Result<TradeRecord, CoreError> {
        let now = self.clock.now_ms();
        self.ledger.buy(self.store.as_mut(), ticker, price, now)
    }

    /// Close a position at the synthetic market price.
    pub fn sell(&mut self, ticker: &str) -> Result<SellOutcome, CoreError> {
        let now = self.clock.now_ms();
        self.ledger
            .sell(self.store.as_mut(), ticker, now, &mut rand::thread_rng())
    }

    /// Sell, then fetch the AI critique and attach it to the new record.
    ///
    /// The trade is committed before the critique is requested, so it is
    /// visible immediately. A provider failure leaves the record without an
    /// annotation; a reset racing the critique discards the late write.
    pub async fn sell_with_feedback(
        &mut self,
        ticker: &str,
        provider: &dyn MarketIntelligence,
    ) -> Result<TradeRecord, CoreError> {
        let basis = self
            .portfolio()
            .position(ticker)
            .map(|p| p.average_price);
        let outcome = self.sell(ticker)?;
        let buy_price = basis.unwrap_or(outcome.record.price);

        match provider
            .trade_feedback(ticker, buy_price, outcome.record.price)
            .await
        {
            Ok(feedback) => {
                self.ledger.attach_analysis(
                    self.store.as_mut(),
                    outcome.generation,
                    outcome.record.id,
                    &feedback,
                )?;
            }
            Err(e) => tracing::warn!(ticker, error = %e, "trade feedback unavailable"),
        }

        let state = self.portfolio();
        Ok(state
            .history
            .iter()
            .find(|r| r.id == outcome.record.id)
            .cloned()
            .unwrap_or(outcome.record))
    }

    /// Restore the default $100,000 ledger. Irreversible; callers are
    /// expected to confirm with the user first.
    pub fn reset_portfolio(&mut self) -> Result<PortfolioState, CoreError> {
        self.ledger.reset(self.store.as_mut())
    }

    // ── Countries & watchlist ───────────────────────────────────────

    /// All known countries, base set first.
    #[must_use]
    pub fn countries(&self) -> &[Country] {
        self.countries.all()
    }

    /// Register country names extracted from provider payloads. Returns how
    /// many were new.
    pub fn add_countries(&mut self, names: &[String]) -> Result<usize, CoreError> {
        self.countries.add_countries(self.store.as_mut(), names)
    }

    #[must_use]
    pub fn watchlist(&self) -> &[String] {
        self.watchlist.tickers()
    }

    pub fn add_to_watchlist(&mut self, ticker: &str) -> Result<bool, CoreError> {
        self.watchlist.add(self.store.as_mut(), ticker)
    }

    pub fn remove_from_watchlist(&mut self, ticker: &str) -> Result<bool, CoreError> {
        self.watchlist.remove(self.store.as_mut(), ticker)
    }
}

impl Default for FinSight {
    fn default() -> Self {
        Self::new()
    }
}
