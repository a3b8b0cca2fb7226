// Exponential Moving Average (EMA) indicator implementation
use super::{checked_closes, require_len, IndicatorCalculator};
use crate::error::Result;
use coinlab_shared::models::{Candle, OverlayValue};
use serde_json::Value;

pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("EMA({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Ema {
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

        let multiplier = 2.0 / (self.period as f64 + 1.0);
        let mut results = Vec::with_capacity(closes.len() - self.period + 1);

        // Calculate initial SMA for the first EMA value
        let initial_sum: f64 = closes.iter().take(self.period).sum();
        let mut previous_ema = initial_sum / self.period as f64;
        results.push(OverlayValue::Single(previous_ema));

        for close in closes.iter().skip(self.period) {
            let ema = (close - previous_ema) * multiplier + previous_ema;
            results.push(OverlayValue::Single(ema));
            previous_ema = ema;
        }
        Ok(results)
    }
}
