use serde::{Deserialize, Serialize};

/// Technical indicator snapshot for one symbol, as shaped by the Market
/// Intelligence Provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: f64,
    pub adx: f64,

    /// Bollinger band bounds are optional — some payloads omit them, and the
    /// band rule only runs when both are present.
    #[serde(default)]
    pub bollinger_upper: Option<f64>,
    #[serde(default)]
    pub bollinger_lower: Option<f64>,
}

impl TechnicalIndicators {
    pub fn new(rsi: f64, macd: f64, adx: f64) -> Self {
        Self {
            rsi,
            macd,
            adx,
            bollinger_upper: None,
            bollinger_lower: None,
        }
    }

    /// Attach Bollinger band bounds.
    pub fn with_bands(mut self, lower: f64, upper: f64) -> Self {
        self.bollinger_lower = Some(lower);
        self.bollinger_upper = Some(upper);
        self
    }
}
