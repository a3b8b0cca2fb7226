// Synthetic OHLCV series anchored to a reference price
use chrono::{DateTime, Utc};
use coinlab_shared::models::{Candle, TimeFrame};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_LOOKBACK: usize = 500;
/// Price used when the caller has no usable reference price for an asset.
pub const FALLBACK_REFERENCE_PRICE: f64 = 100.0;
const MAX_WICK_FRACTION: f64 = 0.01;
const BASE_VOLUME: u64 = 5_000;
const VOLUME_SPREAD: f64 = 10_000.0;

/// Resolves a timeframe label, falling back to the default bucket for unknown input.
pub fn timeframe_from_label(label: &str) -> TimeFrame {
    match label.parse::<TimeFrame>() {
        Ok(tf) => tf,
        Err(e) => {
            let fallback = TimeFrame::default();
            tracing::warn!(%label, %fallback, "{}; using default timeframe", e);
            fallback
        }
    }
}

pub struct SyntheticGenerator {
    rng: StdRng,
    lookback: usize,
}

impl SyntheticGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn with_rng(rng: StdRng) -> Self {
        SyntheticGenerator { rng, lookback: DEFAULT_LOOKBACK }
    }

    /// Sets how many candles are generated before trimming to the display window.
    /// Never less than the largest display window.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        let floor = TimeFrame::all().iter().map(|tf| tf.profile().points_to_display).max().unwrap_or(0);
        self.lookback = lookback.max(floor);
        self
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Generates the full lookback series, oldest first, ending at `now` with
    /// a close of exactly `reference_price`.
    pub fn generate_raw(&mut self, reference_price: f64, timeframe: TimeFrame, now: DateTime<Utc>) -> Vec<Candle> {
        let reference_price = if reference_price.is_finite() && reference_price > 0.0 {
            reference_price
        } else {
            tracing::warn!(reference_price, "Unusable reference price, anchoring series at fallback");
            FALLBACK_REFERENCE_PRICE
        };
        let profile = timeframe.profile();
        let now_ms = now.timestamp_millis();
        let mut running = reference_price;
        let mut series = Vec::with_capacity(self.lookback);

        // Walk backwards: each step's open becomes the previous step's close.
        for i in 0..self.lookback {
            let timestamp = now_ms - i as i64 * profile.interval_ms;
            let change = (self.rng.random::<f64>() - 0.5) * (profile.volatility_percent / 100.0);
            let close = running;
            let open = close / (1.0 + change);
            let high = open.max(close) * (1.0 + self.rng.random::<f64>() * MAX_WICK_FRACTION);
            let low = open.min(close) * (1.0 - self.rng.random::<f64>() * MAX_WICK_FRACTION);
            let volume = BASE_VOLUME + (self.rng.random::<f64>() * VOLUME_SPREAD).floor() as u64;
            series.push(Candle::new(timestamp, open, high, low, close, volume));
            running = open;
        }

        series.sort_by_key(|c| c.timestamp);
        tracing::debug!(?timeframe, points = series.len(), reference_price, "Generated synthetic series");
        series
    }
}

/// Keeps only the trailing display window of `timeframe`.
pub fn trim_to_display(mut series: Vec<Candle>, timeframe: TimeFrame) -> Vec<Candle> {
    let keep = timeframe.profile().points_to_display;
    if series.len() > keep {
        series.drain(..series.len() - keep);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_last_close_matches_reference_for_all_timeframes() {
        let mut generator = SyntheticGenerator::seeded(7);
        for tf in TimeFrame::all() {
            let series = generator.generate_raw(64_250.5, *tf, fixed_now());
            let last = series.last().unwrap();
            assert!((last.close - 64_250.5).abs() < 1e-9, "{:?} ended at {}", tf, last.close);
            assert_eq!(last.timestamp, fixed_now().timestamp_millis());
        }
    }

    #[test]
    fn test_candles_respect_ohlc_envelope() {
        let mut generator = SyntheticGenerator::seeded(11);
        for tf in TimeFrame::all() {
            for candle in generator.generate_raw(1.25, *tf, fixed_now()) {
                assert!(candle.low <= candle.open.min(candle.close));
                assert!(candle.open.max(candle.close) <= candle.high);
                assert!(candle.low > 0.0);
                assert!((5_000..15_000).contains(&candle.volume));
            }
        }
    }

    #[test]
    fn test_timestamps_strictly_increasing() {
        let mut generator = SyntheticGenerator::seeded(3);
        for tf in TimeFrame::all() {
            let series = generator.generate_raw(250.0, *tf, fixed_now());
            assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            let interval = tf.profile().interval_ms;
            assert!(series.windows(2).all(|w| w[1].timestamp - w[0].timestamp == interval));
        }
    }

    #[test]
    fn test_walk_is_continuous() {
        let mut generator = SyntheticGenerator::seeded(5);
        let series = generator.generate_raw(100.0, TimeFrame::Month1, fixed_now());
        for pair in series.windows(2) {
            assert!((pair[0].close - pair[1].open).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = SyntheticGenerator::seeded(42).generate_raw(10.0, TimeFrame::Week1, fixed_now());
        let b = SyntheticGenerator::seeded(42).generate_raw(10.0, TimeFrame::Week1, fixed_now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookback_length_and_trim() {
        let mut generator = SyntheticGenerator::seeded(1);
        let raw = generator.generate_raw(10.0, TimeFrame::Month3, fixed_now());
        assert_eq!(raw.len(), DEFAULT_LOOKBACK);
        let last = raw.last().cloned().unwrap();
        let trimmed = trim_to_display(raw, TimeFrame::Month3);
        assert_eq!(trimmed.len(), 90);
        assert_eq!(trimmed.last().unwrap(), &last);
    }

    #[test]
    fn test_lookback_floor() {
        let generator = SyntheticGenerator::seeded(1).with_lookback(10);
        assert_eq!(generator.lookback(), 90);
    }

    #[test]
    fn test_invalid_reference_price_falls_back() {
        let mut generator = SyntheticGenerator::seeded(9);
        let series = generator.generate_raw(f64::NAN, TimeFrame::Day1, fixed_now());
        assert_eq!(series.last().unwrap().close, FALLBACK_REFERENCE_PRICE);
    }

    #[test]
    fn test_unknown_timeframe_label_falls_back() {
        assert_eq!(timeframe_from_label("1D"), TimeFrame::Day1);
        assert_eq!(timeframe_from_label("6H"), TimeFrame::Month1);
        assert_eq!(timeframe_from_label(""), TimeFrame::Month1);
    }
}
