// Bollinger Bands: SMA middle line with population standard deviation bands
use super::{checked_closes, require_len, IndicatorCalculator};
use crate::error::Result;
use coinlab_shared::models::{Candle, OverlayValue};
use serde_json::Value;

pub struct Bollinger {
    name: String,
    period: usize,
    std_dev: f64,
}

impl Bollinger {
    pub fn new(period: usize, std_dev: f64) -> Self {
        Self {
            name: format!("BB({},{})", period, std_dev),
            period,
            std_dev,
        }
    }
}

impl IndicatorCalculator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period, "std_dev": self.std_dev })
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn calculate(&self, data: &[Candle]) -> Result<Vec<OverlayValue>> {
        require_len(&self.name, data, self.period.max(1))?;
        let closes = checked_closes(&self.name, data)?;
        let n = self.period as f64;

        let results = closes
            .windows(self.period)
            .map(|window| {
                let mid = window.iter().sum::<f64>() / n;
                let variance = window.iter().map(|c| (c - mid).powi(2)).sum::<f64>() / n;
                let width = self.std_dev * variance.sqrt();
                OverlayValue::Band { mid, upper: mid + width, lower: mid - width }
            })
            .collect();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::candles;

    #[test]
    fn test_bands_on_known_window() {
        // mean 5, population std dev 2
        let data = candles(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let results = Bollinger::new(8, 2.0).calculate(&data).unwrap();
        assert_eq!(results.len(), 1);
        match results[0] {
            OverlayValue::Band { mid, upper, lower } => {
                assert!((mid - 5.0).abs() < 1e-12);
                assert!((upper - 9.0).abs() < 1e-12);
                assert!((lower - 1.0).abs() < 1e-12);
            }
            other => panic!("expected a band, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_series_collapses_bands() {
        let data = candles(&[3.0; 25]);
        let results = Bollinger::new(20, 2.0).calculate(&data).unwrap();
        assert_eq!(results.len(), 6);
        for value in results {
            assert_eq!(value, OverlayValue::Band { mid: 3.0, upper: 3.0, lower: 3.0 });
        }
    }

    #[test]
    fn test_insufficient_data() {
        let data = candles(&[1.0; 5]);
        assert!(Bollinger::new(20, 2.0).calculate(&data).is_err());
    }
}
