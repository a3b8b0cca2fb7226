// Paper trading: fee-adjusted position sizing and the settled-trade journal
pub mod equity;
pub mod journal;

pub use equity::calculate_net_equity;
pub use journal::{OpenPosition, PaperTrader};
