//! American odds conversions.

/// Market-implied win probability from American odds.
///
/// Negative prices use `|odds| / (|odds| + 100)`, positive prices
/// `100 / (odds + 100)`. Returns `None` for prices that cannot be American odds.
pub fn implied_probability(american: f64) -> Option<f64> {
    if !american.is_finite() || american.abs() < 100.0 {
        return None;
    }
    if american < 0.0 {
        let odds = american.abs();
        Some(odds / (odds + 100.0))
    } else {
        Some(100.0 / (american + 100.0))
    }
}

/// Fair American price for a win probability.
///
/// Probabilities of one half or more map to negative prices.
pub fn fair_american(probability: f64) -> f64 {
    let p = probability.clamp(1e-6, 1.0 - 1e-6);
    if p >= 0.5 {
        -100.0 * p / (1.0 - p)
    } else {
        100.0 * (1.0 - p) / p
    }
}
