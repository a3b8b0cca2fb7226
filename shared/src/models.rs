use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Direction tag used by chart renderers to colour a candle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CandleDirection {
    Up,
    Down,
}

/// A computed indicator value attached to a candle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OverlayValue {
    Single(f64),
    Band { mid: f64, upper: f64, lower: f64 },
}

impl OverlayValue {
    /// The value a line chart would plot: the value itself, or the band's middle line.
    pub fn primary(&self) -> f64 {
        match self {
            OverlayValue::Single(v) => *v,
            OverlayValue::Band { mid, .. } => *mid,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub body_low: f64,
    pub body_high: f64,
    pub wick_low: f64,
    pub wick_high: f64,
    pub direction: CandleDirection,
    /// Indicator values keyed by overlay slot (`ind_0`, `ind_1`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overlays: BTreeMap<String, OverlayValue>,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            body_low: open.min(close),
            body_high: open.max(close),
            wick_low: low,
            wick_high: high,
            direction: if close >= open { CandleDirection::Up } else { CandleDirection::Down },
            overlays: BTreeMap::new(),
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn overlay(&self, slot: usize) -> Option<&OverlayValue> {
        self.overlays.get(&overlay_key(slot))
    }
}

/// Key under which the indicator in `slot` is stored on each candle.
pub fn overlay_key(slot: usize) -> String {
    format!("ind_{}", slot)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TimeFrame {
    #[serde(rename = "1D")]
    Day1,
    #[serde(rename = "1W")]
    Week1,
    #[default]
    #[serde(rename = "1M")]
    Month1,
    #[serde(rename = "3M")]
    Month3,
    #[serde(rename = "1Y")]
    Year1,
}

/// Display window, candle interval and walk volatility for a timeframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeFrameProfile {
    pub points_to_display: usize,
    pub interval_ms: i64,
    pub volatility_percent: f64,
}

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

impl TimeFrame {
    pub fn profile(&self) -> TimeFrameProfile {
        let (points_to_display, interval_ms, volatility_percent) = match self {
            TimeFrame::Day1 => (24, HOUR_MS, 0.8),
            TimeFrame::Week1 => (14, 12 * HOUR_MS, 1.2),
            TimeFrame::Month1 => (30, DAY_MS, 2.5),
            TimeFrame::Month3 => (90, DAY_MS, 4.0),
            TimeFrame::Year1 => (52, 7 * DAY_MS, 8.0),
        };
        TimeFrameProfile { points_to_display, interval_ms, volatility_percent }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::Day1 => "1D",
            TimeFrame::Week1 => "1W",
            TimeFrame::Month1 => "1M",
            TimeFrame::Month3 => "3M",
            TimeFrame::Year1 => "1Y",
        }
    }

    pub fn all() -> &'static [TimeFrame] {
        &[TimeFrame::Day1, TimeFrame::Week1, TimeFrame::Month1, TimeFrame::Month3, TimeFrame::Year1]
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTimeFrame(pub String);

impl fmt::Display for UnknownTimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown timeframe '{}'", self.0)
    }
}

impl std::error::Error for UnknownTimeFrame {}

impl FromStr for TimeFrame {
    type Err = UnknownTimeFrame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFrame::all()
            .iter()
            .copied()
            .find(|tf| tf.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTimeFrame(s.to_string()))
    }
}

/// Three-state risk classification derived from a percentage price change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolatilityTier {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub change_24h: f64,
    pub volatility: VolatilityTier,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Bollinger,
}

/// Structured indicator selection: family plus its parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorConfig {
    pub kind: IndicatorKind,
    pub period: usize,
    /// Band width in standard deviations; only meaningful for Bollinger Bands.
    #[serde(default)]
    pub std_dev: f64,
}

impl IndicatorConfig {
    pub fn sma(period: usize) -> Self {
        IndicatorConfig { kind: IndicatorKind::Sma, period, std_dev: 0.0 }
    }

    pub fn ema(period: usize) -> Self {
        IndicatorConfig { kind: IndicatorKind::Ema, period, std_dev: 0.0 }
    }

    pub fn rsi(period: usize) -> Self {
        IndicatorConfig { kind: IndicatorKind::Rsi, period, std_dev: 0.0 }
    }

    pub fn bollinger(period: usize, std_dev: f64) -> Self {
        IndicatorConfig { kind: IndicatorKind::Bollinger, period, std_dev }
    }

    /// Resolves a free-text indicator label into a config.
    ///
    /// Matching is a case-insensitive substring test: "rsi" selects RSI(14),
    /// "bollinger" selects Bollinger(20, 2), anything else is a simple moving
    /// average whose period is picked from an embedded 200/100/50, else 20.
    pub fn from_label(label: &str) -> Self {
        let name = label.to_lowercase();
        if name.contains("rsi") {
            IndicatorConfig::rsi(14)
        } else if name.contains("bollinger") {
            IndicatorConfig::bollinger(20, 2.0)
        } else if name.contains("200") {
            IndicatorConfig::sma(200)
        } else if name.contains("100") {
            IndicatorConfig::sma(100)
        } else if name.contains("50") {
            IndicatorConfig::sma(50)
        } else {
            IndicatorConfig::sma(20)
        }
    }

    pub fn parameters(&self) -> serde_json::Value {
        match self.kind {
            IndicatorKind::Bollinger => serde_json::json!({ "period": self.period, "std_dev": self.std_dev }),
            _ => serde_json::json!({ "period": self.period }),
        }
    }
}

/// Catalogue entry describing an indicator to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorDefinition {
    pub name: String,
    pub summary: String,
}

impl IndicatorDefinition {
    pub fn config(&self) -> IndicatorConfig {
        IndicatorConfig::from_label(&self.name)
    }
}
