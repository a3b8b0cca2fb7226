// Chart pipeline: generate, overlay, trim, annotate
use crate::analysis::patterns::PatternDetector;
use crate::analysis::volatility::classify_volatility;
use crate::data::generator::{timeframe_from_label, trim_to_display, SyntheticGenerator};
use crate::indicators::overlay::{OverlayEngine, OverlayOutcome, MAX_ACTIVE_INDICATORS};
use chrono::{DateTime, Utc};
use coinlab_shared::models::{Candle, IndicatorConfig, IndicatorDefinition, TimeFrame, VolatilityTier};
use coinlab_shared::trading::PatternReport;
use coinlab_shared::utils::percent_change;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub timeframe: TimeFrame,
    pub candles: Vec<Candle>,
    /// Configs that were honoured, in slot order.
    pub indicators: Vec<IndicatorConfig>,
    pub overlays: Vec<OverlayOutcome>,
}

impl ChartSeries {
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// Percentage move across the displayed window, first open to last close.
    pub fn change_percent(&self) -> f64 {
        match (self.candles.first(), self.candles.last()) {
            (Some(first), Some(last)) => percent_change(first.open, last.close),
            _ => 0.0,
        }
    }

    pub fn volatility(&self) -> VolatilityTier {
        classify_volatility(self.change_percent())
    }
}

pub struct ChartService {
    generator: SyntheticGenerator,
    overlay: OverlayEngine,
    detector: PatternDetector,
}

impl ChartService {
    pub fn new(generator: SyntheticGenerator) -> Self {
        ChartService { generator, overlay: OverlayEngine::new(), detector: PatternDetector::default() }
    }

    pub fn with_detector(mut self, detector: PatternDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Builds the display series for `timeframe`. Indicators are computed on the
    /// full lookback so the displayed window has no warm-up gaps where history allows.
    pub fn build_chart(
        &mut self,
        reference_price: f64,
        timeframe: TimeFrame,
        indicators: &[IndicatorConfig],
        now: DateTime<Utc>,
    ) -> ChartSeries {
        let mut raw = self.generator.generate_raw(reference_price, timeframe, now);
        let overlays = self.overlay.apply(&mut raw, indicators);
        let candles = trim_to_display(raw, timeframe);
        tracing::debug!(
            %timeframe,
            candles = candles.len(),
            applied = overlays.iter().filter(|o| o.is_applied()).count(),
            "Chart built"
        );
        let indicators = indicators.iter().take(MAX_ACTIVE_INDICATORS).copied().collect();
        ChartSeries { timeframe, candles, indicators, overlays }
    }

    /// Same as [`build_chart`](Self::build_chart) for callers holding labels:
    /// the timeframe falls back to the default bucket and each indicator name
    /// is resolved to a config once, up front.
    pub fn build_chart_from_labels(
        &mut self,
        reference_price: f64,
        timeframe: &str,
        definitions: &[IndicatorDefinition],
        now: DateTime<Utc>,
    ) -> ChartSeries {
        let configs: Vec<IndicatorConfig> = definitions.iter().map(|d| d.config()).collect();
        self.build_chart(reference_price, timeframe_from_label(timeframe), &configs, now)
    }

    pub fn detect_patterns(&self, series: &ChartSeries) -> PatternReport {
        self.detector.detect(&series.candles)
    }
}
