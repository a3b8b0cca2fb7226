// Generated-text insights: summaries and structured trade signals
use crate::analysis::signals::{fib_levels, read_signals};
use crate::analysis::volatility::status_text;
use crate::error::{EngineError, Result};
use crate::services::chart_service::ChartSeries;
use async_trait::async_trait;
use chrono::Utc;
use coinlab_shared::models::Asset;
use coinlab_shared::trading::{PatternReport, SignalDirection, TradeSignal};

const SIGNAL_INSTRUCTIONS: &str = "Respond with a single JSON object with the fields \
direction (LONG, SHORT or NEUTRAL), confidence (0-100), techScore (0-100), newsScore (0-100), \
reasoning and simpleRecommendation.";

/// Anything that turns a prompt into text, typically a hosted language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct InsightService<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> InsightService<G> {
    pub fn new(generator: G) -> Self {
        InsightService { generator }
    }

    pub async fn summarize(&self, prompt: &str) -> Result<String> {
        let text = self.generator.generate(prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::InsightError("Generator returned an empty summary".to_string()));
        }
        Ok(text.to_string())
    }

    pub async fn extract_signal(&self, prompt: &str) -> Result<TradeSignal> {
        let request = format!("{}\n\n{}", prompt, SIGNAL_INSTRUCTIONS);
        let raw = self.generator.generate(&request).await?;
        let signal = parse_signal(&raw)?;
        tracing::debug!(direction = ?signal.direction, confidence = signal.confidence, "Extracted trade signal");
        Ok(signal)
    }
}

/// Parses a signal out of generated text, accepting a bare object or one
/// wrapped in prose or a fenced code block. Scores are clamped to 0-100.
pub fn parse_signal(raw: &str) -> Result<TradeSignal> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let body = match (start, end) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => return Err(EngineError::InsightError("No JSON object in generated signal".to_string())),
    };

    let mut signal: TradeSignal = serde_json::from_str(body)
        .map_err(|e| EngineError::InsightError(format!("Malformed signal JSON: {}", e)))?;
    signal.confidence = clamp_score(signal.confidence);
    signal.tech_score = clamp_score(signal.tech_score);
    signal.news_score = clamp_score(signal.news_score);
    if signal.timestamp == 0 {
        signal.timestamp = Utc::now().timestamp_millis();
    }
    Ok(signal)
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Plain-text description of a chart, used as context for prompts.
pub fn describe_chart(asset: &Asset, series: &ChartSeries, report: &PatternReport) -> String {
    let patterns = if report.patterns.is_empty() {
        "none (not enough history)".to_string()
    } else {
        report.patterns.join(", ")
    };
    let tier = series.volatility();
    let signals = read_signals(&series.candles, &series.indicators, report)
        .iter()
        .map(|s| format!("{} is {}", s.name, s.value))
        .collect::<Vec<_>>()
        .join(". ");
    let fib = fib_levels(&series.candles)
        .iter()
        .map(|l| format!("{} {:.6}", l.label, l.price))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Asset: {} ({}), category {}.\nLast price: {:.6}. Timeframe {} change: {:.2}% ({:?} volatility, {}).\n\
         Candles: {}. Patterns: {} [{:?} reliability].\nTechnical signals: {}.\nFibonacci: {}.",
        asset.name,
        asset.symbol,
        asset.category,
        series.last_close().unwrap_or(asset.price),
        series.timeframe,
        series.change_percent(),
        tier,
        status_text(tier),
        series.candles.len(),
        patterns,
        report.reliability,
        if signals.is_empty() { "none".to_string() } else { signals },
        if fib.is_empty() { "n/a".to_string() } else { fib },
    )
}

/// Local stand-in for a hosted model so sessions run without network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.contains(SIGNAL_INSTRUCTIONS) {
            let bullish = prompt.contains("Bullish Engulfing") || prompt.contains("Hammer");
            let signal = TradeSignal {
                direction: if bullish { SignalDirection::Long } else { SignalDirection::Neutral },
                confidence: if bullish { 70.0 } else { 50.0 },
                tech_score: if bullish { 65.0 } else { 50.0 },
                news_score: 50.0,
                reasoning: "Offline heuristic based on the detected candlestick formations.".to_string(),
                simple_recommendation: if bullish {
                    "Buyers are showing up; a small practice position is reasonable.".to_string()
                } else {
                    "No clear edge; wait for a cleaner setup.".to_string()
                },
                timestamp: Utc::now().timestamp_millis(),
            };
            return Ok(serde_json::to_string(&signal)?);
        }

        let headline = prompt.lines().next().unwrap_or_default();
        Ok(format!("Offline briefing. {} Markets are volatile; treat this as practice, not advice.", headline))
    }
}
