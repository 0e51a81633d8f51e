use crate::models::indicators::TechnicalIndicators;
use crate::models::settings::AlertSettings;
use crate::notify::{NotificationSink, Permission};
use crate::storage::traits::KeyValueStore;

/// Minimum interval between alert batches for the same symbol (1 hour).
pub const ALERT_COOLDOWN_MS: i64 = 3_600_000;

/// What a rule concluded about a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
    Momentum,
    Trend,
}

/// A single rule-derived message.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub message: String,
}

/// Evaluates technical-indicator rules and delivers notifications under a
/// per-symbol cooldown persisted in the store.
///
/// The cooldown is keyed per symbol, not per rule: a new qualifying condition
/// on the same symbol inside the window stays silent. That false-negative is
/// accepted to keep a re-polling UI quiet.
pub struct AlertEvaluator;

impl AlertEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Pure rule evaluation — no I/O, no cooldown. Easy to test.
    ///
    /// Each rule is gated by its enable flag and appends at most one signal.
    /// The RSI bounds cannot both hold for one value, so buy and sell are
    /// mutually exclusive per call.
    pub fn evaluate_signals(
        indicators: &TechnicalIndicators,
        settings: &AlertSettings,
        current_price: Option<f64>,
    ) -> Vec<Signal> {
        let mut signals = Vec::new();

        if settings.rsi_enabled {
            if indicators.rsi <= settings.rsi_low {
                signals.push(Signal {
                    kind: SignalKind::Buy,
                    message: format!("BUY SIGNAL: RSI Oversold ({:.1})", indicators.rsi),
                });
            } else if indicators.rsi >= settings.rsi_high {
                signals.push(Signal {
                    kind: SignalKind::Sell,
                    message: format!("SELL SIGNAL: RSI Overbought ({:.1})", indicators.rsi),
                });
            }
        }

        if settings.bb_enabled {
            if let (Some(price), Some(upper), Some(lower)) = (
                current_price,
                indicators.bollinger_upper,
                indicators.bollinger_lower,
            ) {
                if price <= lower {
                    signals.push(Signal {
                        kind: SignalKind::Buy,
                        message: format!("BUY SIGNAL: Price hit BB Lower ({price:.2})"),
                    });
                } else if price >= upper {
                    signals.push(Signal {
                        kind: SignalKind::Sell,
                        message: format!("SELL SIGNAL: Price hit BB Upper ({price:.2})"),
                    });
                }
            }
        }

        if settings.macd_enabled && indicators.macd >= settings.macd_high {
            signals.push(Signal {
                kind: SignalKind::Momentum,
                message: format!("ALERT: MACD Strengthening ({:.2})", indicators.macd),
            });
        }

        if settings.adx_enabled && indicators.adx >= settings.adx_high {
            signals.push(Signal {
                kind: SignalKind::Trend,
                message: format!("TREND CONFIRMED: ADX Strong ({:.1})", indicators.adx),
            });
        }

        signals
    }

    /// Fire-and-forget check for one symbol.
    ///
    /// 1. Inside the cooldown window: return immediately, no rules run.
    /// 2. Evaluate rules; an empty signal list writes nothing, so the symbol
    ///    stays eligible for an immediate re-check.
    /// 3. Deliver through the sink and record the cooldown regardless of the
    ///    delivery outcome.
    #[allow(clippy::too_many_arguments)]
    pub fn check(
        &self,
        store: &mut dyn KeyValueStore,
        sink: &mut dyn NotificationSink,
        symbol: &str,
        indicators: &TechnicalIndicators,
        settings: &AlertSettings,
        current_price: Option<f64>,
        now_ms: i64,
    ) {
        let cooldown_key = format!("last_alert_{symbol}");

        if let Some(raw) = store.get(&cooldown_key) {
            // Unparsable timestamps count as no cooldown.
            if let Ok(last_fired) = raw.trim().parse::<i64>() {
                if now_ms - last_fired < ALERT_COOLDOWN_MS {
                    return;
                }
            }
        }

        let signals = Self::evaluate_signals(indicators, settings, current_price);
        if signals.is_empty() {
            return;
        }

        let body = signals
            .iter()
            .map(|s| s.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self::deliver(sink, &format!("FinSight Alert: {symbol}"), &body);

        let _ = store.set(&cooldown_key, &now_ms.to_string());
    }

    /// Tri-state delivery: granted delivers, undetermined asks once and
    /// delivers only if granted, denied drops silently.
    fn deliver(sink: &mut dyn NotificationSink, title: &str, body: &str) {
        match sink.permission() {
            Permission::Granted => sink.notify(title, body),
            Permission::Undetermined => {
                if sink.request_permission() == Permission::Granted {
                    sink.notify(title, body);
                }
            }
            Permission::Denied => {}
        }
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
