// Asset catalog: the seed list of tradable coins and their reference prices
use crate::analysis::volatility::classify_volatility;
use crate::error::{EngineError, Result};
use coinlab_shared::models::Asset;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct CatalogCsvParser;

impl CatalogCsvParser {
    // CSV Header: symbol,name,category,price,change_24h
    // Example Row: BTC,Bitcoin,Layer 1,64250.50,2.14
    pub fn load_from_path(path: &Path) -> Result<Vec<Asset>> {
        let file = File::open(path)?;
        let assets = Self::load_from_reader(BufReader::new(file))?;
        tracing::info!(path = %path.display(), assets = assets.len(), "Loaded asset catalog");
        Ok(assets)
    }

    pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<Asset>> {
        let mut rdr = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let mut assets = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let symbol = Self::required_field(&record, &headers, "symbol", line)?;
            let name = Self::required_field(&record, &headers, "name", line)?;
            let category = Self::get_field(&record, &headers, "category").unwrap_or("Other");
            let price = Self::parse_number(Self::required_field(&record, &headers, "price", line)?, "price", line)?;
            let change_24h = match Self::get_field(&record, &headers, "change_24h") {
                Some(raw) if !raw.is_empty() => Self::parse_number(raw, "change_24h", line)?,
                _ => 0.0,
            };

            if !(price.is_finite() && price > 0.0) {
                return Err(EngineError::CatalogFormatError(format!(
                    "Price for '{}' must be positive at line {}, got {}",
                    symbol, line, price
                )));
            }

            assets.push(Asset {
                symbol: symbol.to_uppercase(),
                name: name.to_string(),
                category: category.to_string(),
                price,
                change_24h,
                volatility: classify_volatility(change_24h),
            });
        }
        Ok(assets)
    }

    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str) -> Option<&'a str> {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .and_then(|pos| record.get(pos))
    }

    fn required_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<&'a str> {
        match Self::get_field(record, headers, name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(EngineError::CatalogFormatError(format!("Missing '{}' field at line {}", name, line))),
        }
    }

    fn parse_number(raw: &str, field: &str, line: usize) -> Result<f64> {
        raw.parse::<f64>().map_err(|e| {
            EngineError::CatalogFormatError(format!("Error parsing '{}' at line {}: '{}' ({})", field, line, raw, e))
        })
    }
}

/// Built-in seed used when no catalog file is configured.
pub fn default_catalog() -> Vec<Asset> {
    const SEED: &[(&str, &str, &str, f64, f64)] = &[
        ("BTC", "Bitcoin", "Layer 1", 64_250.50, 2.14),
        ("ETH", "Ethereum", "Layer 1", 3_420.75, 3.62),
        ("SOL", "Solana", "Layer 1", 145.30, -5.41),
        ("ADA", "Cardano", "Layer 1", 0.45, -1.20),
        ("XRP", "XRP", "Payments", 0.52, 0.85),
        ("DOT", "Polkadot", "Layer 0", 6.85, -2.33),
        ("DOGE", "Dogecoin", "Meme", 0.16, 9.75),
        ("LINK", "Chainlink", "Oracle", 14.20, 4.10),
        ("AVAX", "Avalanche", "Layer 1", 34.60, -7.80),
        ("UNI", "Uniswap", "DeFi", 9.75, 1.05),
    ];

    SEED.iter()
        .map(|&(symbol, name, category, price, change_24h)| Asset {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price,
            change_24h,
            volatility: classify_volatility(change_24h),
        })
        .collect()
}
