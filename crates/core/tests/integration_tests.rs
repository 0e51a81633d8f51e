// ═══════════════════════════════════════════════════════════════════
// Integration Tests — the FinSight facade wired end to end
// ═══════════════════════════════════════════════════════════════════

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;

use finsight_core::clock::Clock;
use finsight_core::errors::CoreError;
use finsight_core::models::cache::TtlClass;
use finsight_core::models::indicators::TechnicalIndicators;
use finsight_core::models::portfolio::{TradeType, DEFAULT_CAPITAL};
use finsight_core::models::settings::AlertSettings;
use finsight_core::notify::{NotificationSink, Permission};
use finsight_core::providers::traits::MarketIntelligence;
use finsight_core::storage::memory::MemoryStore;
use finsight_core::storage::traits::KeyValueStore;
use finsight_core::{FinSight, DEFAULT_CACHE_NAMESPACE};

const T0: i64 = 1_700_000_000_000;

// ── Test doubles ────────────────────────────────────────────────────

/// Clock the test can advance by hand.
#[derive(Clone)]
struct FixedClock {
    now: Rc<Cell<i64>>,
}

impl FixedClock {
    fn at(now_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(now_ms)),
        }
    }

    fn advance(&self, delta_ms: i64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// Store handle that survives dropping the facade, for reload tests.
#[derive(Clone)]
struct SharedStore {
    inner: Rc<RefCell<MemoryStore>>,
}

impl SharedStore {
    fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryStore::new())),
        }
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.inner.borrow_mut().set(key, value)
    }

    fn clear(&mut self) {
        self.inner.borrow_mut().clear();
    }
}

struct MockIntelligence {
    reply: Option<String>,
}

#[async_trait]
impl MarketIntelligence for MockIntelligence {
    async fn trade_feedback(
        &self,
        ticker: &str,
        buy_price: f64,
        sell_price: f64,
    ) -> Result<String, CoreError> {
        match &self.reply {
            Some(reply) => Ok(format!(
                "{reply} ({ticker} {buy_price:.2} -> {sell_price:.2})"
            )),
            None => Err(CoreError::Provider("intelligence offline".into())),
        }
    }
}

struct RecordingSink {
    delivered: Vec<(String, String)>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            delivered: Vec::new(),
        }
    }
}

impl NotificationSink for RecordingSink {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn notify(&mut self, title: &str, body: &str) {
        self.delivered.push((title.to_string(), body.to_string()));
    }
}

fn finsight_at(clock: &FixedClock) -> FinSight {
    FinSight::with_store(
        Box::new(MemoryStore::new()),
        Box::new(clock.clone()),
        DEFAULT_CACHE_NAMESPACE,
    )
}

// ═══════════════════════════════════════════════════════════════════
// Trading through the facade
// ═══════════════════════════════════════════════════════════════════

mod trading {
    use super::*;

    #[test]
    fn buy_then_sell_round_trip() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);

        app.buy("AAPL", 150.0).unwrap();
        clock.advance(1_000);
        let outcome = app.sell("AAPL").unwrap();

        assert_eq!(outcome.record.trade_type, TradeType::Sell);
        assert_eq!(outcome.record.timestamp, T0 + 1_000);

        let state = app.portfolio();
        assert!(state.position("AAPL").is_none());
        assert_eq!(state.history.len(), 2);
    }

    #[test]
    fn set_capital_then_overspend() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);

        app.set_capital("1000").unwrap();
        let result = app.buy("NVDA", 500.0);
        assert!(matches!(result, Err(CoreError::InsufficientBalance { .. })));
        assert_eq!(app.portfolio().balance, 1_000.0);
    }

    #[test]
    fn reset_restores_the_default_ledger() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);

        app.buy("AAPL", 150.0).unwrap();
        let state = app.reset_portfolio().unwrap();
        assert_eq!(state.balance, DEFAULT_CAPITAL);
        assert!(app.portfolio().history.is_empty());
    }

    #[tokio::test]
    async fn sell_with_feedback_annotates_the_record() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);
        let provider = MockIntelligence {
            reply: Some("Good discipline".into()),
        };

        app.buy("AAPL", 100.0).unwrap();
        let record = app.sell_with_feedback("AAPL", &provider).await.unwrap();

        let analysis = record.ai_analysis.unwrap();
        assert!(analysis.starts_with("Good discipline (AAPL 100.00 -> "));

        // The annotation is persisted, not just returned
        let state = app.portfolio();
        assert!(state.history[0].ai_analysis.is_some());
    }

    #[tokio::test]
    async fn provider_failure_leaves_the_trade_unannotated() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);
        let provider = MockIntelligence { reply: None };

        app.buy("AAPL", 100.0).unwrap();
        let record = app.sell_with_feedback("AAPL", &provider).await.unwrap();

        // The sell itself committed; only the critique is missing
        assert_eq!(record.trade_type, TradeType::Sell);
        assert!(record.ai_analysis.is_none());
        assert!(app.portfolio().position("AAPL").is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Cached fetches through the facade
// ═══════════════════════════════════════════════════════════════════

mod cached_fetches {
    use super::*;

    #[tokio::test]
    async fn cache_hit_respects_the_injected_clock() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);
        let calls = Cell::new(0);

        let produce = |value: u32| {
            let calls = &calls;
            move || {
                calls.set(calls.get() + 1);
                async move { Ok(value) }
            }
        };

        let first = app
            .fetch_cached("eco_stats_Japan", TtlClass::Hourly, produce(1))
            .await
            .unwrap();
        assert_eq!(first.data, 1);

        // 59 minutes later: still served from the cache
        clock.advance(59 * 60_000);
        let hit = app
            .fetch_cached("eco_stats_Japan", TtlClass::Hourly, produce(2))
            .await
            .unwrap();
        assert_eq!(hit.data, 1);
        assert_eq!(hit.timestamp, T0);

        // Past the hour: refetched
        clock.advance(2 * 60_000);
        let refreshed = app
            .fetch_cached("eco_stats_Japan", TtlClass::Hourly, produce(3))
            .await
            .unwrap();
        assert_eq!(refreshed.data, 3);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn quota_recovery_is_visible_through_the_eviction_counter() {
        let clock = FixedClock::at(T0);
        let mut app = FinSight::with_store(
            Box::new(MemoryStore::with_quota(200)),
            Box::new(clock.clone()),
            DEFAULT_CACHE_NAMESPACE,
        );

        let filler = "x".repeat(90);
        app.fetch_cached("bulky", TtlClass::Weekly, || async move { Ok(filler) })
            .await
            .unwrap();
        assert_eq!(app.cache_evictions(), 0);

        // The second entry does not fit; the store is evicted once
        let filler = "y".repeat(90);
        let fetched = app
            .fetch_cached("bulky_two", TtlClass::Weekly, || async move { Ok(filler) })
            .await
            .unwrap();
        assert_eq!(fetched.data.len(), 90);
        assert_eq!(app.cache_evictions(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Alerts through the facade
// ═══════════════════════════════════════════════════════════════════

mod alerts {
    use super::*;

    #[test]
    fn saved_settings_drive_the_evaluation() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);
        let mut sink = RecordingSink::new();

        // RSI 40 is quiet under the defaults
        let ind = TechnicalIndicators::new(40.0, 0.0, 10.0);
        app.check_alerts(&mut sink, "AAPL", &ind, None);
        assert!(sink.delivered.is_empty());

        // Raise the oversold threshold and the same reading fires
        let settings = AlertSettings {
            rsi_low: 45.0,
            ..AlertSettings::default()
        };
        app.save_alert_settings(&settings).unwrap();
        assert_eq!(app.alert_settings().rsi_low, 45.0);

        app.check_alerts(&mut sink, "AAPL", &ind, None);
        assert_eq!(sink.delivered.len(), 1);
        assert_eq!(sink.delivered[0].0, "FinSight Alert: AAPL");
    }

    #[test]
    fn cooldown_follows_the_injected_clock() {
        let clock = FixedClock::at(T0);
        let mut app = finsight_at(&clock);
        let mut sink = RecordingSink::new();
        let oversold = TechnicalIndicators::new(25.0, 0.0, 10.0);

        app.check_alerts(&mut sink, "AAPL", &oversold, None);
        clock.advance(30 * 60_000);
        app.check_alerts(&mut sink, "AAPL", &oversold, None);
        assert_eq!(sink.delivered.len(), 1);

        clock.advance(31 * 60_000);
        app.check_alerts(&mut sink, "AAPL", &oversold, None);
        assert_eq!(sink.delivered.len(), 2);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Countries, watchlist and persistence across restarts
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    fn finsight_on(store: &SharedStore, clock: &FixedClock) -> FinSight {
        FinSight::with_store(
            Box::new(store.clone()),
            Box::new(clock.clone()),
            DEFAULT_CACHE_NAMESPACE,
        )
    }

    #[test]
    fn discovered_countries_survive_a_restart() {
        let store = SharedStore::new();
        let clock = FixedClock::at(T0);

        {
            let mut app = finsight_on(&store, &clock);
            assert_eq!(app.countries().len(), 5);
            let added = app
                .add_countries(&["South Korea".into(), "japan".into()])
                .unwrap();
            // "japan" collides with the base entry
            assert_eq!(added, 1);
        }

        let app = finsight_on(&store, &clock);
        assert_eq!(app.countries().len(), 6);
        assert!(app.countries().iter().any(|c| c.id == "south_korea"));
    }

    #[test]
    fn watchlist_edits_survive_a_restart() {
        let store = SharedStore::new();
        let clock = FixedClock::at(T0);

        {
            let mut app = finsight_on(&store, &clock);
            assert!(app.add_to_watchlist("amd").unwrap());
            assert!(app.remove_from_watchlist("TSLA").unwrap());
        }

        let app = finsight_on(&store, &clock);
        assert_eq!(app.watchlist(), ["AAPL", "NVDA", "AMD"]);
    }

    #[test]
    fn portfolio_survives_a_restart() {
        let store = SharedStore::new();
        let clock = FixedClock::at(T0);

        {
            let mut app = finsight_on(&store, &clock);
            app.buy("AAPL", 150.0).unwrap();
        }

        let app = finsight_on(&store, &clock);
        let state = app.portfolio();
        assert!(state.position("AAPL").is_some());
        assert_eq!(state.balance, DEFAULT_CAPITAL - 1_500.0);
    }
}
