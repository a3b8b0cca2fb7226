// Candlestick formation detection on the last two candles of a series

use coinlab_shared::models::Candle;
use coinlab_shared::trading::{PatternPoint, PatternReport, Reliability};

/// Fewer candles than this and the detector refuses to guess.
pub const MIN_CANDLES: usize = 20;
pub const STEADY_STATE: &str = "Steady State";

/// A formation recognised from the previous and the last candle of a series.
pub trait CandleRule: Send + Sync {
    /// Name reported in [`PatternReport::patterns`].
    fn label(&self) -> &str;

    /// Returns the annotation for the last candle if the formation is present.
    fn evaluate(&self, prev: &Candle, last: &Candle, last_index: usize) -> Option<PatternPoint>;
}

/// Bullish candle whose body swallows a preceding bearish body.
pub struct BullishEngulfing;

impl CandleRule for BullishEngulfing {
    fn label(&self) -> &str {
        "Bullish Engulfing"
    }

    fn evaluate(&self, prev: &Candle, last: &Candle, last_index: usize) -> Option<PatternPoint> {
        let engulfs = last.is_bullish() && prev.is_bearish() && last.close > prev.open && last.open < prev.close;
        engulfs.then(|| PatternPoint {
            index: last_index,
            name: "B.ENG".to_string(),
            description: "Buyers swallowed sellers.".to_string(),
            price: last.high,
        })
    }
}

/// Long lower wick relative to the body: sellers were rejected at the lows.
pub struct Hammer {
    pub wick_to_body: f64,
}

impl Default for Hammer {
    fn default() -> Self {
        Hammer { wick_to_body: 2.5 }
    }
}

impl CandleRule for Hammer {
    fn label(&self) -> &str {
        "Hammer"
    }

    fn evaluate(&self, _prev: &Candle, last: &Candle, last_index: usize) -> Option<PatternPoint> {
        (last.lower_wick() > last.body_size() * self.wick_to_body).then(|| PatternPoint {
            index: last_index,
            name: "HAMMER".to_string(),
            description: "Bottom rejection.".to_string(),
            price: last.low,
        })
    }
}

pub struct PatternDetector {
    rules: Vec<Box<dyn CandleRule>>,
    min_candles: usize,
}

impl Default for PatternDetector {
    fn default() -> Self {
        PatternDetector::empty().with_rule(BullishEngulfing).with_rule(Hammer::default())
    }
}

impl PatternDetector {
    /// A detector with no rules; every sufficiently long series is a steady state.
    pub fn empty() -> Self {
        PatternDetector { rules: Vec::new(), min_candles: MIN_CANDLES }
    }

    pub fn with_rule<R: CandleRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_labels(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.label()).collect()
    }

    pub fn detect(&self, candles: &[Candle]) -> PatternReport {
        if candles.len() < self.min_candles {
            tracing::debug!(candles = candles.len(), required = self.min_candles, "Not enough candles for pattern detection");
            return PatternReport::insufficient_data();
        }

        let last_index = candles.len() - 1;
        let last = &candles[last_index];
        let prev = &candles[last_index - 1];

        let mut patterns = Vec::new();
        let mut points = Vec::new();
        for rule in &self.rules {
            if let Some(point) = rule.evaluate(prev, last, last_index) {
                patterns.push(rule.label().to_string());
                points.push(point);
            }
        }

        if patterns.is_empty() {
            return PatternReport { patterns: vec![STEADY_STATE.to_string()], reliability: Reliability::Medium, points };
        }
        tracing::debug!(?patterns, "Candlestick formations detected");
        PatternReport { patterns, reliability: Reliability::High, points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(i: i64) -> Candle {
        Candle::new(i, 100.0, 100.5, 99.5, 100.0, 1000)
    }

    fn series_with_tail(prev: Candle, last: Candle) -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..18).map(flat).collect();
        candles.push(prev);
        candles.push(last);
        candles
    }

    #[test]
    fn test_bullish_engulfing_detected() {
        let prev = Candle::new(18, 100.0, 101.0, 89.5, 90.0, 1000);
        let last = Candle::new(19, 89.0, 103.0, 88.0, 102.0, 1000);
        let report = PatternDetector::default().detect(&series_with_tail(prev, last));
        assert!(report.contains("Bullish Engulfing"));
        assert_eq!(report.reliability, Reliability::High);
        let point = report.points.iter().find(|p| p.name == "B.ENG").unwrap();
        assert_eq!(point.index, 19);
        assert_eq!(point.price, 103.0);
    }

    #[test]
    fn test_hammer_detected() {
        let prev = flat(18);
        // body 1.0, lower wick 5.0
        let last = Candle::new(19, 100.0, 101.2, 95.0, 101.0, 1000);
        let report = PatternDetector::default().detect(&series_with_tail(prev, last));
        assert_eq!(report.patterns, vec!["Hammer".to_string()]);
        assert_eq!(report.reliability, Reliability::High);
        assert_eq!(report.points[0].price, 95.0);
    }

    #[test]
    fn test_steady_state_when_nothing_fires() {
        let report = PatternDetector::default().detect(&(0..25).map(flat).collect::<Vec<_>>());
        // flat candles have zero body and a 0.5 lower wick, which is a hammer
        assert!(report.contains("Hammer"));

        let mut candles: Vec<Candle> = (0..24).map(flat).collect();
        candles.push(Candle::new(24, 100.0, 102.1, 99.9, 102.0, 1000));
        let report = PatternDetector::default().detect(&candles);
        assert_eq!(report.patterns, vec![STEADY_STATE.to_string()]);
        assert_eq!(report.reliability, Reliability::Medium);
        assert!(report.points.is_empty());
    }

    #[test]
    fn test_short_series_is_low_reliability() {
        let prev = Candle::new(8, 100.0, 101.0, 89.5, 90.0, 1000);
        let last = Candle::new(9, 89.0, 103.0, 80.0, 102.0, 1000);
        let mut candles: Vec<Candle> = (0..8).map(flat).collect();
        candles.push(prev);
        candles.push(last);
        assert_eq!(candles.len(), 10);
        let report = PatternDetector::default().detect(&candles);
        assert!(report.patterns.is_empty());
        assert!(report.points.is_empty());
        assert_eq!(report.reliability, Reliability::Low);
    }

    #[test]
    fn test_custom_rule_is_pluggable() {
        struct AlwaysDoji;
        impl CandleRule for AlwaysDoji {
            fn label(&self) -> &str {
                "Doji"
            }
            fn evaluate(&self, _prev: &Candle, last: &Candle, last_index: usize) -> Option<PatternPoint> {
                Some(PatternPoint { index: last_index, name: "DOJI".to_string(), description: String::new(), price: last.close })
            }
        }

        let detector = PatternDetector::empty().with_rule(AlwaysDoji);
        assert_eq!(detector.rule_labels(), vec!["Doji"]);
        let report = detector.detect(&(0..20).map(flat).collect::<Vec<_>>());
        assert_eq!(report.patterns, vec!["Doji".to_string()]);
        assert_eq!(report.reliability, Reliability::High);
    }
}
