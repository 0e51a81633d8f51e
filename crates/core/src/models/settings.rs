use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::storage::traits::KeyValueStore;

/// Storage key for the serialized alert settings.
pub const SETTINGS_KEY: &str = "fin_settings";

/// Per-rule thresholds and enable flags for technical alerts.
///
/// Every field falls back to its documented default, so older or
/// partially-written payloads load without scattered null-checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertSettings {
    /// RSI at or below this fires a buy signal.
    pub rsi_low: f64,
    /// RSI at or above this fires a sell signal.
    pub rsi_high: f64,
    pub rsi_enabled: bool,

    /// MACD at or above this fires a strengthening-momentum alert (one-sided).
    pub macd_high: f64,
    pub macd_enabled: bool,

    /// ADX at or above this fires a trend-confirmed alert.
    pub adx_high: f64,
    pub adx_enabled: bool,

    /// Bollinger band touch rule (needs a current price and both bounds).
    pub bb_enabled: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            rsi_low: 30.0,
            rsi_high: 70.0,
            rsi_enabled: true,
            macd_high: 0.5,
            macd_enabled: true,
            adx_high: 25.0,
            adx_enabled: true,
            bb_enabled: true,
        }
    }
}

impl AlertSettings {
    /// Load from the store. Missing or corrupted JSON falls back to defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        store
            .get(SETTINGS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        let json = serde_json::to_string(self)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        store.set(SETTINGS_KEY, &json)
    }
}
