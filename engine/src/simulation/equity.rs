// Fee and spread model for a fixed paper stake
use coinlab_shared::trading::TradeSimulation;

pub const BASE_AMOUNT: f64 = 100.0;
pub const FEE_RATE: f64 = 0.015;
pub const SPREAD_RATE: f64 = 0.005;

/// Net equity of a $100 paper position after fee and spread, and the price
/// the asset must reach for the position to be worth $100 again.
pub fn calculate_net_equity(entry_price: f64) -> TradeSimulation {
    let net_equity = BASE_AMOUNT - BASE_AMOUNT * FEE_RATE - BASE_AMOUNT * SPREAD_RATE;
    TradeSimulation {
        base_amount: BASE_AMOUNT,
        // reported as the total entry cost; the spread is also reported on its own
        fee_percentage: (FEE_RATE + SPREAD_RATE) * 100.0,
        spread_percentage: SPREAD_RATE * 100.0,
        entry_price,
        net_equity,
        break_even_price: entry_price * BASE_AMOUNT / net_equity,
    }
}
