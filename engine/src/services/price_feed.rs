// Polling price feed: periodic quote fetches folded into the quote board
use crate::data::market_data::{MarketSnapshot, Quote, QuoteBoard};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;

/// Shortest polling period; `tokio::time::interval` rejects a zero period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Upstream provider of current quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>>;
}

/// Source with no upstream: every cycle drifts the seeded prices.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineQuoteSource;

#[async_trait]
impl QuoteSource for OfflineQuoteSource {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        Ok(Vec::new())
    }
}

pub struct PriceFeed {
    board: Arc<Mutex<QuoteBoard>>,
    updates: watch::Receiver<MarketSnapshot>,
    ticker: JoinHandle<()>,
}

impl PriceFeed {
    /// Starts polling `source` every `interval`. Each cycle runs as its own
    /// task, so a slow fetch does not hold back the next one; whichever cycle
    /// resolves last is the snapshot subscribers see.
    pub fn spawn<Q: QuoteSource>(source: Q, board: QuoteBoard, interval: Duration) -> Self {
        let interval = if interval < MIN_POLL_INTERVAL {
            tracing::warn!(requested_ms = interval.as_millis() as u64, "Polling interval too short, clamped");
            MIN_POLL_INTERVAL
        } else {
            interval
        };
        let (tx, rx) = watch::channel(board.snapshot(0));
        let board = Arc::new(Mutex::new(board));
        let ticker = tokio::spawn(run_ticker(Arc::new(source), board.clone(), Arc::new(tx), interval));
        tracing::info!(interval_ms = interval.as_millis() as u64, "Price feed started");
        PriceFeed { board, updates: rx, ticker }
    }

    pub fn subscribe(&self) -> watch::Receiver<MarketSnapshot> {
        self.updates.clone()
    }

    /// Stream of snapshots, starting with the current one.
    pub fn updates(&self) -> WatchStream<MarketSnapshot> {
        WatchStream::new(self.updates.clone())
    }

    pub fn latest(&self) -> MarketSnapshot {
        self.updates.borrow().clone()
    }

    pub async fn reference_price(&self, symbol: &str) -> Option<f64> {
        self.board.lock().await.reference_price(symbol)
    }

    /// Stops polling and cancels fetches still in flight.
    pub fn shutdown(&self) {
        if !self.ticker.is_finished() {
            tracing::info!("Price feed stopped");
        }
        self.ticker.abort();
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn run_ticker<Q: QuoteSource>(
    source: Arc<Q>,
    board: Arc<Mutex<QuoteBoard>>,
    tx: Arc<watch::Sender<MarketSnapshot>>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Dropping the set when this task is aborted cancels every in-flight fetch.
    let mut in_flight = JoinSet::new();
    let mut cycle: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cycle += 1;
                let source = source.clone();
                let board = board.clone();
                let tx = tx.clone();
                in_flight.spawn(async move {
                    let fetched = source.fetch_quotes().await;
                    let snapshot = board.lock().await.apply_quotes(fetched);
                    tracing::debug!(cycle, live_count = snapshot.live_count, "Price feed cycle resolved");
                    tx.send_replace(snapshot);
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        tracing::error!(error = %e, "Price feed cycle panicked");
                    }
                }
            }
        }
    }
}
