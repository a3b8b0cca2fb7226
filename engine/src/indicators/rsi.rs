// Relative Strength Index (RSI) indicator implementation
use super::{checked_closes, require_len, IndicatorCalculator};
use crate::error::Result;
use coinlab_shared::models::{Candle, OverlayValue};
use serde_json::Value;

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI({})", period),
            period,
        }
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // No losses in the window; also covers a perfectly flat window.
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn calculate(&self, data: &[Candle]) -> Result<Vec<OverlayValue>> {
        // RSI needs 'period' changes, i.e. period + 1 closes, for the first value
        require_len(&self.name, data, self.period.max(1) + 1)?;
        let closes = checked_closes(&self.name, data)?;
        let period = self.period as f64;

        let mut gains = 0.0;
        let mut losses = 0.0;

        // Calculate initial average gain and loss
        for i in 1..=self.period {
            let change = closes[i] - closes[i - 1];
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change; // losses are positive values
            }
        }

        let mut avg_gain = gains / period;
        let mut avg_loss = losses / period;
        let mut results = Vec::with_capacity(closes.len() - self.period);
        results.push(OverlayValue::Single(rsi_from_averages(avg_gain, avg_loss)));

        // Wilder's smoothing for subsequent values
        for i in (self.period + 1)..closes.len() {
            let change = closes[i] - closes[i - 1];
            let (current_gain, current_loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };

            avg_gain = (avg_gain * (period - 1.0) + current_gain) / period;
            avg_loss = (avg_loss * (period - 1.0) + current_loss) / period;
            results.push(OverlayValue::Single(rsi_from_averages(avg_gain, avg_loss)));
        }
        Ok(results)
    }
}
