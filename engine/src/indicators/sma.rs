// Simple Moving Average (SMA) indicator implementation
use super::{checked_closes, require_len, IndicatorCalculator};
use crate::error::Result;
use coinlab_shared::models::{Candle, OverlayValue};
use serde_json::Value;

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("SMA({})", period),
            period,
        }
    }
}

/// Rolling mean over `period` values; empty when there are fewer values.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let mut results = Vec::with_capacity(values.len() - period + 1);

    // Calculate sum for the first window
    let mut sum: f64 = values.iter().take(period).sum();
    results.push(sum / period as f64);

    // Slide the window
    for i in period..values.len() {
        sum = sum - values[i - period] + values[i];
        results.push(sum / period as f64);
    }
    results
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn calculate(&self, data: &[Candle]) -> Result<Vec<OverlayValue>> {
        require_len(&self.name, data, self.period.max(1))?;
        let closes = checked_closes(&self.name, data)?;
        Ok(rolling_mean(&closes, self.period).into_iter().map(OverlayValue::Single).collect())
    }
}
