// Volatility tiers from percentage moves
use coinlab_shared::models::VolatilityTier;

const RED_THRESHOLD: f64 = 7.0;
const YELLOW_THRESHOLD: f64 = 3.0;

/// Maps a percentage change to a risk tier. Thresholds are strict: a move of
/// exactly 7% is YELLOW and exactly 3% is GREEN.
pub fn classify_volatility(change_percent: f64) -> VolatilityTier {
    let magnitude = change_percent.abs();
    if magnitude > RED_THRESHOLD {
        VolatilityTier::Red
    } else if magnitude > YELLOW_THRESHOLD {
        VolatilityTier::Yellow
    } else {
        VolatilityTier::Green
    }
}

/// Short risk label shown next to a tier.
pub fn status_text(tier: VolatilityTier) -> &'static str {
    match tier {
        VolatilityTier::Green => "SAFE",
        VolatilityTier::Yellow => "CAUTION",
        VolatilityTier::Red => "RISKY",
    }
}
