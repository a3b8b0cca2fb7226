// Paper-trading, pattern and signal records handed to UI consumers.
use serde::{Deserialize, Serialize};

/// A simulated position opened with a fixed $100 stake.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TradeSimulation {
    pub base_amount: f64,
    pub fee_percentage: f64,
    pub spread_percentage: f64,
    pub entry_price: f64,
    pub net_equity: f64,
    pub break_even_price: f64,
}

impl TradeSimulation {
    /// Position value if the asset were marked at `price`.
    pub fn equity_at(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return self.net_equity;
        }
        self.net_equity * (price / self.entry_price)
    }
}

/// Settled paper trade as recorded in the journal ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: String,
    /// Epoch milliseconds at settlement.
    pub timestamp: i64,
    pub symbol: String,
    pub name: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub initial_equity: f64,
    pub final_equity: f64,
    pub pnl_value: f64,
    pub pnl_percent: f64,
    pub justification: String,
    pub ai_score: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Reliability {
    Low,
    Medium,
    High,
}

/// Annotation pinned to a candle of the series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternPoint {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternReport {
    pub patterns: Vec<String>,
    pub reliability: Reliability,
    pub points: Vec<PatternPoint>,
}

impl PatternReport {
    pub fn insufficient_data() -> Self {
        PatternReport { patterns: Vec::new(), reliability: Reliability::Low, points: Vec::new() }
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.iter().any(|p| p == pattern)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Long,
    Short,
    Neutral,
}

/// Structured trade idea extracted from generated text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeSignal {
    pub direction: SignalDirection,
    /// 0-100
    pub confidence: f64,
    pub tech_score: f64,
    pub news_score: f64,
    pub reasoning: String,
    pub simple_recommendation: String,
    #[serde(default)]
    pub timestamp: i64,
}
