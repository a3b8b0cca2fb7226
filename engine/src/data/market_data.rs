// Live quote board: seeds the catalog, merges fetched quotes, drifts the rest
use crate::analysis::volatility::classify_volatility;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use coinlab_shared::models::{Asset, VolatilityTier};
use coinlab_shared::utils::round_to;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A price observation for one symbol from an upstream source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change_24h: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarketSnapshot {
    pub assets: Vec<Asset>,
    pub updated_at: DateTime<Utc>,
    /// Number of assets priced from a fetched quote rather than drift.
    pub live_count: usize,
}

impl MarketSnapshot {
    pub fn asset(&self, symbol: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.symbol.eq_ignore_ascii_case(symbol))
    }
}

pub struct QuoteBoard {
    assets: Vec<Asset>,
    rng: StdRng,
}

impl QuoteBoard {
    pub fn new(assets: Vec<Asset>, rng: StdRng) -> Self {
        QuoteBoard { assets, rng }
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn reference_price(&self, symbol: &str) -> Option<f64> {
        self.assets.iter().find(|a| a.symbol.eq_ignore_ascii_case(symbol)).map(|a| a.price)
    }

    /// Folds one fetch cycle into the board. Assets without a matching quote,
    /// or every asset when the fetch failed, take a random drift step.
    pub fn apply_quotes(&mut self, fetched: Result<Vec<Quote>, EngineError>) -> MarketSnapshot {
        let quotes = match fetched {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(error = %e, "Quote fetch failed, using drift fallback for all assets");
                Vec::new()
            }
        };

        let mut live_count = 0;
        for i in 0..self.assets.len() {
            let matched = quotes.iter().find(|q| q.symbol.eq_ignore_ascii_case(&self.assets[i].symbol));
            match matched {
                Some(quote) if quote.price.is_finite() && quote.price > 0.0 => {
                    let asset = &mut self.assets[i];
                    let change = round_to(quote.change_24h.unwrap_or(0.0), 2);
                    asset.price = quote.price;
                    asset.change_24h = change;
                    asset.volatility = classify_volatility(change);
                    live_count += 1;
                }
                _ => {
                    let drifted = drift_price(&self.assets[i], &mut self.rng);
                    self.assets[i] = drifted;
                }
            }
        }

        tracing::debug!(assets = self.assets.len(), live_count, "Quote board updated");
        self.snapshot(live_count)
    }

    pub fn snapshot(&self, live_count: usize) -> MarketSnapshot {
        MarketSnapshot { assets: self.assets.clone(), updated_at: Utc::now(), live_count }
    }
}

/// One random-walk step for an asset with no live quote. Volatility tier is
/// kept; the drift amplitude depends on it.
pub fn drift_price<R: Rng>(asset: &Asset, rng: &mut R) -> Asset {
    let drift_factor = match asset.volatility {
        VolatilityTier::Red => 0.008,
        VolatilityTier::Yellow => 0.003,
        VolatilityTier::Green => 0.001,
    };
    let random_move = (rng.random::<f64>() - 0.5) * 2.0 * drift_factor;
    let change_drift = (rng.random::<f64>() - 0.5) * 0.15;
    Asset {
        price: asset.price * (1.0 + random_move),
        change_24h: round_to(asset.change_24h + change_drift, 2),
        ..asset.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::default_catalog;
    use rand::SeedableRng;

    fn board() -> QuoteBoard {
        QuoteBoard::new(default_catalog(), StdRng::seed_from_u64(17))
    }

    #[test]
    fn test_matching_quote_overrides_price() {
        let mut board = board();
        let snapshot = board.apply_quotes(Ok(vec![Quote {
            symbol: "btc".to_string(),
            price: 70_000.0,
            change_24h: Some(8.456),
        }]));
        let btc = snapshot.asset("BTC").unwrap();
        assert_eq!(btc.price, 70_000.0);
        assert_eq!(btc.change_24h, 8.46);
        assert_eq!(btc.volatility, VolatilityTier::Red);
        assert_eq!(snapshot.live_count, 1);
    }

    #[test]
    fn test_unmatched_assets_drift_within_bounds() {
        let mut board = board();
        let before: Vec<Asset> = board.assets().to_vec();
        let snapshot = board.apply_quotes(Ok(Vec::new()));
        assert_eq!(snapshot.live_count, 0);
        for (old, new) in before.iter().zip(snapshot.assets.iter()) {
            let limit = match old.volatility {
                VolatilityTier::Red => 0.008,
                VolatilityTier::Yellow => 0.003,
                VolatilityTier::Green => 0.001,
            };
            assert!(((new.price / old.price) - 1.0).abs() <= limit + 1e-12);
            assert!((new.change_24h - old.change_24h).abs() <= 0.0801);
            assert_eq!(new.volatility, old.volatility);
        }
    }

    #[test]
    fn test_failed_fetch_drifts_everything() {
        let mut board = board();
        let snapshot = board.apply_quotes(Err(EngineError::ProcessingError("gateway 503".to_string())));
        assert_eq!(snapshot.live_count, 0);
        assert_eq!(snapshot.assets.len(), default_catalog().len());
    }

    #[test]
    fn test_invalid_quote_price_is_ignored() {
        let mut board = board();
        let snapshot = board.apply_quotes(Ok(vec![Quote { symbol: "ETH".to_string(), price: -1.0, change_24h: None }]));
        assert_eq!(snapshot.live_count, 0);
        assert!(snapshot.asset("ETH").unwrap().price > 0.0);
    }

    #[test]
    fn test_reference_price_lookup() {
        let board = board();
        assert_eq!(board.reference_price("sol"), Some(145.30));
        assert_eq!(board.reference_price("NOPE"), None);
    }
}
