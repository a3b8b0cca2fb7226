// Engine main entry point: runs one offline practice session
use anyhow::Context;
use chrono::Utc;
use coinlab_engine::analysis::{classify_volatility, read_signals, status_text};
use coinlab_engine::config::EngineSettings;
use coinlab_engine::data::catalog::{default_catalog, CatalogCsvParser};
use coinlab_engine::data::{QuoteBoard, SyntheticGenerator};
use coinlab_engine::services::{describe_chart, ChartService, InsightService, OfflineGenerator, OfflineQuoteSource, PriceFeed};
use coinlab_engine::simulation::PaperTrader;
use coinlab_engine::storage::FileStore;
use coinlab_shared::models::IndicatorConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting CoinLab engine...");

    let settings = EngineSettings::from_env().context("loading engine settings")?;
    let store = FileStore::open(&settings.storage_path)
        .with_context(|| format!("opening store at {}", settings.storage_path.display()))?;

    let catalog = match &settings.catalog_path {
        Some(path) => CatalogCsvParser::load_from_path(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => default_catalog(),
    };
    info!(assets = catalog.len(), seeded = settings.seed.is_some(), "Catalog loaded");

    let board_rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    };
    let feed = PriceFeed::spawn(
        OfflineQuoteSource,
        QuoteBoard::new(catalog, board_rng),
        Duration::from_millis(settings.poll_interval_ms),
    );

    let mut updates = feed.updates().take(settings.session_ticks + 1);
    let mut snapshot = feed.latest();
    while let Some(next) = updates.next().await {
        info!(updated_at = %next.updated_at, live = next.live_count, "Market snapshot");
        snapshot = next;
    }

    let asset = snapshot.assets.first().cloned().context("catalog is empty")?;
    let reference_price = feed.reference_price(&asset.symbol).await.unwrap_or(asset.price);

    let generator = SyntheticGenerator::from_seed_option(settings.seed).with_lookback(settings.lookback_points);
    let mut charts = ChartService::new(generator);
    let indicators = [IndicatorConfig::rsi(14), IndicatorConfig::bollinger(20, 2.0), IndicatorConfig::sma(50)];
    let series = charts.build_chart(reference_price, settings.default_timeframe, &indicators, Utc::now());
    let report = charts.detect_patterns(&series);
    info!(
        symbol = %asset.symbol,
        timeframe = %series.timeframe,
        change = series.change_percent(),
        tier = ?series.volatility(),
        day_tier = ?classify_volatility(asset.change_24h),
        patterns = ?report.patterns,
        reliability = ?report.reliability,
        "Chart analysed"
    );
    for signal in read_signals(&series.candles, &series.indicators, &report) {
        info!(name = %signal.name, value = %signal.value, bias = ?signal.bias, "Technical signal");
    }
    info!(status = status_text(series.volatility()), "Risk status");

    let insights = InsightService::new(OfflineGenerator);
    let context = describe_chart(&asset, &series, &report);
    let briefing = insights.summarize(&context).await?;
    info!(%briefing, "Market briefing");
    let signal = insights.extract_signal(&context).await?;
    info!(direction = ?signal.direction, confidence = signal.confidence, "Trade signal");

    let mut trader = PaperTrader::new(store);
    let entry_price = series.last_close().unwrap_or(reference_price);
    let simulation = trader.open_position(&asset.symbol, &asset.name, entry_price)?;
    info!(break_even = simulation.break_even_price, "Break-even price for the practice trade");

    let exit_price = snapshot.asset(&asset.symbol).map(|a| a.price).unwrap_or(entry_price);
    info!(equity = trader.mark(exit_price), "Position marked");
    let entry = trader.close_position(exit_price, &signal.simple_recommendation, signal.confidence.round() as u8)?;
    info!(pnl = entry.pnl_value, pnl_percent = entry.pnl_percent, "Practice trade settled");

    let ledger = trader.entries()?;
    info!(trades = ledger.len(), "Journal updated");

    feed.shutdown();
    Ok(())
}
