// Chart annotations: candlestick formations, overlay readings and volatility tiers
pub mod patterns;
pub mod signals;
pub mod volatility;

pub use patterns::{BullishEngulfing, CandleRule, Hammer, PatternDetector};
pub use signals::{fib_levels, read_signals, FibLevel, SignalBias, TechnicalSignal};
pub use volatility::{classify_volatility, status_text};
