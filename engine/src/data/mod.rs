// Market data: synthetic candle series, asset catalog and quote board
pub mod catalog;
pub mod generator;
pub mod market_data;

pub use generator::{timeframe_from_label, trim_to_display, SyntheticGenerator};
pub use market_data::{MarketSnapshot, Quote, QuoteBoard};
