// Attaches indicator series to candles, right-aligned to the tail of the series
use super::build_calculator;
use coinlab_shared::models::{overlay_key, Candle, IndicatorConfig};
use serde::Serialize;

pub const MAX_ACTIVE_INDICATORS: usize = 3;

/// What happened to one requested indicator slot.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OverlayOutcome {
    Applied { slot: usize, name: String, values: usize },
    Failed { slot: usize, reason: String },
}

impl OverlayOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, OverlayOutcome::Applied { .. })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OverlayEngine;

impl OverlayEngine {
    pub fn new() -> Self {
        OverlayEngine
    }

    /// Computes each config over the whole series and stores its values under
    /// `ind_<slot>`. A failing indicator is logged and leaves its slot absent
    /// on every candle; the other slots are unaffected. Configs beyond
    /// [`MAX_ACTIVE_INDICATORS`] are ignored.
    pub fn apply(&self, candles: &mut [Candle], configs: &[IndicatorConfig]) -> Vec<OverlayOutcome> {
        if configs.len() > MAX_ACTIVE_INDICATORS {
            tracing::warn!(
                requested = configs.len(),
                max = MAX_ACTIVE_INDICATORS,
                "Too many indicators requested, extra selections ignored"
            );
        }

        configs
            .iter()
            .take(MAX_ACTIVE_INDICATORS)
            .enumerate()
            .map(|(slot, config)| self.apply_one(candles, slot, config))
            .collect()
    }

    fn apply_one(&self, candles: &mut [Candle], slot: usize, config: &IndicatorConfig) -> OverlayOutcome {
        let key = overlay_key(slot);
        let computed = build_calculator(config).and_then(|calc| {
            let values = calc.calculate(candles)?;
            Ok((calc.name().to_string(), values))
        });

        let (name, values) = match computed {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(slot, kind = ?config.kind, period = config.period, error = %e, "Indicator computation failed");
                return OverlayOutcome::Failed { slot, reason: e.to_string() };
            }
        };

        // Windowed output is shorter than the input; line it up with the newest candles.
        let offset = candles.len().saturating_sub(values.len());
        for (candle, value) in candles[offset..].iter_mut().zip(values.iter()) {
            candle.overlays.insert(key.clone(), *value);
        }

        tracing::debug!(slot, %name, values = values.len(), offset, "Indicator overlay applied");
        OverlayOutcome::Applied { slot, name, values: values.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generator::SyntheticGenerator;
    use crate::indicators::sma::rolling_mean;
    use chrono::{TimeZone, Utc};
    use coinlab_shared::models::{OverlayValue, TimeFrame};

    fn raw_series(seed: u64) -> Vec<Candle> {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        SyntheticGenerator::seeded(seed).generate_raw(3_420.75, TimeFrame::Month1, now)
    }

    #[test]
    fn test_sma_overlay_matches_reference() {
        let mut candles = raw_series(21);
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let outcomes = OverlayEngine::new().apply(&mut candles, &[IndicatorConfig::sma(50)]);
        assert!(outcomes[0].is_applied());

        let overlaid: Vec<f64> = candles.iter().filter_map(|c| c.overlay(0)).map(|v| v.primary()).collect();
        let reference = rolling_mean(&closes, 50);
        assert_eq!(overlaid.len(), reference.len());
        for (a, b) in overlaid.iter().zip(reference.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
        // warm-up rows carry no value
        assert!(candles[..49].iter().all(|c| c.overlay(0).is_none()));
        assert!(candles[49..].iter().all(|c| c.overlay(0).is_some()));
    }

    #[test]
    fn test_rsi_overlay_bounded() {
        let mut candles = raw_series(22);
        OverlayEngine::new().apply(&mut candles, &[IndicatorConfig::rsi(14)]);
        let values: Vec<f64> = candles.iter().filter_map(|c| c.overlay(0)).map(|v| v.primary()).collect();
        assert_eq!(values.len(), candles.len() - 14);
        assert!(values.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn test_bollinger_overlay_is_band() {
        let mut candles = raw_series(23);
        OverlayEngine::new().apply(&mut candles, &[IndicatorConfig::bollinger(20, 2.0)]);
        match candles.last().unwrap().overlay(0) {
            Some(OverlayValue::Band { mid, upper, lower }) => assert!(lower <= mid && mid <= upper),
            other => panic!("expected band, got {:?}", other),
        }
    }

    #[test]
    fn test_failing_indicator_does_not_block_others() {
        let mut candles = raw_series(24);
        let configs = [IndicatorConfig::rsi(14), IndicatorConfig::sma(0), IndicatorConfig::bollinger(20, 2.0)];
        let outcomes = OverlayEngine::new().apply(&mut candles, &configs);

        assert!(outcomes[0].is_applied());
        assert!(matches!(outcomes[1], OverlayOutcome::Failed { slot: 1, .. }));
        assert!(outcomes[2].is_applied());
        assert!(candles.iter().all(|c| c.overlay(1).is_none()));
        let last = candles.last().unwrap();
        assert!(last.overlay(0).is_some());
        assert!(last.overlay(2).is_some());
    }

    #[test]
    fn test_period_longer_than_series_fails_alone() {
        let mut candles = raw_series(25);
        let configs = [IndicatorConfig::sma(10_000), IndicatorConfig::sma(20)];
        let outcomes = OverlayEngine::new().apply(&mut candles, &configs);
        assert!(!outcomes[0].is_applied());
        assert!(outcomes[1].is_applied());
    }

    #[test]
    fn test_at_most_three_indicators() {
        let mut candles = raw_series(26);
        let configs = [
            IndicatorConfig::sma(20),
            IndicatorConfig::sma(50),
            IndicatorConfig::ema(20),
            IndicatorConfig::rsi(14),
        ];
        let outcomes = OverlayEngine::new().apply(&mut candles, &configs);
        assert_eq!(outcomes.len(), 3);
        assert!(candles.iter().all(|c| c.overlay(3).is_none()));
    }
}
