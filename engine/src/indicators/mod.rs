// Technical indicators module
pub mod bollinger;
pub mod ema;
pub mod overlay;
pub mod rsi;
pub mod sma;

pub use bollinger::Bollinger;
pub use ema::Ema;
pub use overlay::{OverlayEngine, OverlayOutcome, MAX_ACTIVE_INDICATORS};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::error::{EngineError, Result};
use coinlab_shared::models::{Candle, IndicatorConfig, IndicatorKind, OverlayValue};
use serde_json::Value;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    /// Number of leading candles that produce no value.
    fn warmup(&self) -> usize;
    /// Values for `data[warmup()..]`, one per candle, oldest first.
    fn calculate(&self, data: &[Candle]) -> Result<Vec<OverlayValue>>;
}

/// Builds the calculator for a config, rejecting parameters no indicator can use.
pub fn build_calculator(config: &IndicatorConfig) -> Result<Box<dyn IndicatorCalculator>> {
    if config.period == 0 {
        return Err(EngineError::IndicatorError(format!("{:?} period cannot be 0", config.kind)));
    }
    let calculator: Box<dyn IndicatorCalculator> = match config.kind {
        IndicatorKind::Sma => Box::new(Sma::new(config.period)),
        IndicatorKind::Ema => Box::new(Ema::new(config.period)),
        IndicatorKind::Rsi => Box::new(Rsi::new(config.period)),
        IndicatorKind::Bollinger => {
            if !(config.std_dev.is_finite() && config.std_dev > 0.0) {
                return Err(EngineError::IndicatorError(format!(
                    "Bollinger band width must be a positive number of deviations, got {}",
                    config.std_dev
                )));
            }
            Box::new(Bollinger::new(config.period, config.std_dev))
        }
    };
    Ok(calculator)
}

/// Closing prices, rejecting series that contain non-finite values.
pub(crate) fn checked_closes(name: &str, data: &[Candle]) -> Result<Vec<f64>> {
    data.iter()
        .enumerate()
        .map(|(i, c)| {
            if c.close.is_finite() {
                Ok(c.close)
            } else {
                Err(EngineError::IndicatorError(format!("{}: non-finite close at index {}", name, i)))
            }
        })
        .collect()
}

pub(crate) fn require_len(name: &str, data: &[Candle], needed: usize) -> Result<()> {
    if data.len() < needed {
        return Err(EngineError::IndicatorError(format!(
            "{} needs at least {} candles, got {}",
            name,
            needed,
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use coinlab_shared::models::Candle;

    pub fn create_candle(close: f64) -> Candle {
        Candle::new(0, close, close, close, close, 0)
    }

    pub fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64, c, c, c, c, 0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_zero_period() {
        assert!(build_calculator(&IndicatorConfig::sma(0)).is_err());
        assert!(build_calculator(&IndicatorConfig::rsi(0)).is_err());
    }

    #[test]
    fn test_build_rejects_bad_band_width() {
        assert!(build_calculator(&IndicatorConfig::bollinger(20, 0.0)).is_err());
        assert!(build_calculator(&IndicatorConfig::bollinger(20, f64::NAN)).is_err());
    }

    #[test]
    fn test_build_names() {
        assert_eq!(build_calculator(&IndicatorConfig::sma(50)).unwrap().name(), "SMA(50)");
        assert_eq!(build_calculator(&IndicatorConfig::rsi(14)).unwrap().name(), "RSI(14)");
        assert_eq!(build_calculator(&IndicatorConfig::bollinger(20, 2.0)).unwrap().name(), "BB(20,2)");
    }
}
