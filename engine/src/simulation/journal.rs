// Paper trader: one open position at a time, settled trades go to a persisted ledger
use super::equity::{calculate_net_equity, BASE_AMOUNT};
use crate::error::{EngineError, Result};
use crate::storage::KeyValueStore;
use chrono::Utc;
use coinlab_shared::trading::{JournalEntry, TradeSimulation};
use std::io::Write;
use uuid::Uuid;

pub const JOURNAL_KEY: &str = "journal";

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub symbol: String,
    pub name: String,
    pub simulation: TradeSimulation,
    pub opened_at: i64,
}

pub struct PaperTrader<S: KeyValueStore> {
    store: S,
    position: Option<OpenPosition>,
}

impl<S: KeyValueStore> PaperTrader<S> {
    pub fn new(store: S) -> Self {
        PaperTrader { store, position: None }
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    pub fn open_position(&mut self, symbol: &str, name: &str, price: f64) -> Result<TradeSimulation> {
        if let Some(open) = &self.position {
            return Err(EngineError::SimulationError(format!(
                "A {} position is already open; close it before opening {}",
                open.symbol, symbol
            )));
        }
        if !(price.is_finite() && price > 0.0) {
            return Err(EngineError::SimulationError(format!("Cannot open {} at price {}", symbol, price)));
        }

        let simulation = calculate_net_equity(price);
        tracing::info!(
            %symbol,
            entry_price = price,
            net_equity = simulation.net_equity,
            break_even = simulation.break_even_price,
            "Paper position opened"
        );
        self.position = Some(OpenPosition {
            symbol: symbol.to_string(),
            name: name.to_string(),
            simulation,
            opened_at: Utc::now().timestamp_millis(),
        });
        Ok(simulation)
    }

    /// Current equity of the open position, or the untouched stake when flat.
    pub fn mark(&self, price: f64) -> f64 {
        match &self.position {
            Some(open) => open.simulation.equity_at(price),
            None => BASE_AMOUNT,
        }
    }

    /// Settles the open position at `exit_price` and prepends it to the ledger.
    pub fn close_position(&mut self, exit_price: f64, justification: &str, ai_score: u8) -> Result<JournalEntry> {
        let mut ledger = self.entries()?;
        let Some(open) = self.position.take() else {
            return Err(EngineError::SimulationError("No open position to close".to_string()));
        };

        let final_equity = open.simulation.equity_at(exit_price);
        let pnl_value = final_equity - BASE_AMOUNT;
        let entry = JournalEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            symbol: open.symbol.clone(),
            name: open.name.clone(),
            entry_price: open.simulation.entry_price,
            exit_price,
            initial_equity: open.simulation.net_equity,
            final_equity,
            pnl_value,
            pnl_percent: pnl_value / BASE_AMOUNT * 100.0,
            justification: justification.to_string(),
            ai_score: ai_score.min(100),
        };

        ledger.insert(0, entry.clone());
        if let Err(e) = self.store.save_json(JOURNAL_KEY, &ledger) {
            // keep the position open so the caller can retry the settlement
            self.position = Some(open);
            return Err(e);
        }

        tracing::info!(symbol = %entry.symbol, exit_price, pnl = entry.pnl_value, "Paper position closed");
        Ok(entry)
    }

    /// Settled trades, newest first.
    pub fn entries(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.store.load_json::<Vec<JournalEntry>>(JOURNAL_KEY)?.unwrap_or_default())
    }

    pub fn clear(&self) -> Result<()> {
        tracing::info!("Clearing paper trading journal");
        self.store.remove(JOURNAL_KEY)
    }

    /// Writes the ledger as CSV, returning the number of rows written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.entries()?;
        let mut wtr = csv::Writer::from_writer(writer);
        for entry in &entries {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(entries.len())
    }
}
