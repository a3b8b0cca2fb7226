// Plain-language readings of the newest candle's overlays, plus Fibonacci retracement levels
use coinlab_shared::models::{Candle, IndicatorConfig, IndicatorKind, OverlayValue};
use coinlab_shared::trading::PatternReport;
use serde::Serialize;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
/// Band width relative to the middle band below which the bands count as squeezed.
pub const SQUEEZE_WIDTH: f64 = 0.05;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
    Warning,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TechnicalSignal {
    pub name: String,
    pub value: String,
    pub bias: SignalBias,
}

impl TechnicalSignal {
    fn new(name: impl Into<String>, value: impl Into<String>, bias: SignalBias) -> Self {
        TechnicalSignal { name: name.into(), value: value.into(), bias }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub label: &'static str,
    pub price: f64,
}

/// Reads each configured slot on the last candle, then adds one warning per
/// detected formation. Slots with no value on the last candle are skipped.
pub fn read_signals(candles: &[Candle], configs: &[IndicatorConfig], report: &PatternReport) -> Vec<TechnicalSignal> {
    let mut signals: Vec<TechnicalSignal> = report
        .patterns
        .iter()
        .map(|p| TechnicalSignal::new("PATTERN", p.to_uppercase(), SignalBias::Warning))
        .collect();

    let Some(last) = candles.last() else {
        return signals;
    };

    for (slot, config) in configs.iter().enumerate() {
        let Some(value) = last.overlay(slot) else {
            tracing::debug!(slot, kind = ?config.kind, "No overlay value on the last candle");
            continue;
        };
        signals.push(match config.kind {
            IndicatorKind::Rsi => read_rsi(config.period, value.primary()),
            IndicatorKind::Bollinger => read_bands(last.close, value),
            IndicatorKind::Sma | IndicatorKind::Ema => read_trend(last.close, value.primary()),
        });
    }
    signals
}

fn read_rsi(period: usize, rsi: f64) -> TechnicalSignal {
    let name = format!("RSI ({})", period);
    let rounded = rsi.round();
    if rsi > RSI_OVERBOUGHT {
        TechnicalSignal::new(name, format!("{} (OVERBOUGHT)", rounded), SignalBias::Bearish)
    } else if rsi < RSI_OVERSOLD {
        TechnicalSignal::new(name, format!("{} (OVERSOLD)", rounded), SignalBias::Bullish)
    } else {
        TechnicalSignal::new(name, rounded.to_string(), SignalBias::Neutral)
    }
}

fn read_bands(close: f64, value: &OverlayValue) -> TechnicalSignal {
    let OverlayValue::Band { mid, upper, lower } = *value else {
        return TechnicalSignal::new("BBANDS", "IN RANGE", SignalBias::Neutral);
    };
    if close > upper {
        TechnicalSignal::new("BBANDS", "BREAKOUT UP", SignalBias::Bullish)
    } else if close < lower {
        TechnicalSignal::new("BBANDS", "BREAKOUT DOWN", SignalBias::Bearish)
    } else if mid != 0.0 && (upper - lower) / mid < SQUEEZE_WIDTH {
        TechnicalSignal::new("BBANDS", "SQUEEZE (PRE-MOVE)", SignalBias::Neutral)
    } else {
        TechnicalSignal::new("BBANDS", "IN RANGE", SignalBias::Neutral)
    }
}

fn read_trend(close: f64, average: f64) -> TechnicalSignal {
    if close > average {
        TechnicalSignal::new("MA TREND", "PRICE > AVG", SignalBias::Bullish)
    } else {
        TechnicalSignal::new("MA TREND", "PRICE < AVG", SignalBias::Bearish)
    }
}

/// Retracement levels over the window's full high/low range, top to bottom.
pub fn fib_levels(candles: &[Candle]) -> Vec<FibLevel> {
    if candles.is_empty() {
        return Vec::new();
    }
    let max = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let min = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let range = max - min;
    vec![
        FibLevel { ratio: 0.0, label: "0%", price: max },
        FibLevel { ratio: 0.618, label: "61.8%", price: max - range * 0.618 },
        FibLevel { ratio: 1.0, label: "100%", price: min },
    ]
}
