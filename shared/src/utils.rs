// Small numeric helpers shared across the engine and its consumers.

/// Rounds to `decimals` places the way price tickers display them.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Percentage move from `from` to `to`; zero when `from` is zero.
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(-2.005, 1), -2.0);
        assert_eq!(round_to(7.0, 0), 7.0);
    }

    #[test]
    fn test_percent_change() {
        assert!((percent_change(100.0, 108.0) - 8.0).abs() < 1e-9);
        assert!((percent_change(50.0, 45.0) + 10.0).abs() < 1e-9);
        assert_eq!(percent_change(0.0, 10.0), 0.0);
    }
}
