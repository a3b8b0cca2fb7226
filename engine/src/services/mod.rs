// Services built on top of the data, indicator and analysis layers
pub mod chart_service;
pub mod insight;
pub mod price_feed;

pub use chart_service::{ChartSeries, ChartService};
pub use insight::{describe_chart, parse_signal, InsightService, OfflineGenerator, TextGenerator};
pub use price_feed::{OfflineQuoteSource, PriceFeed, QuoteSource};
