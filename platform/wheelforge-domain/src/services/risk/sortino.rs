use crate::services::price_series::TRADING_DAYS_PER_YEAR;

/// Returned when no step falls below the daily risk-free rate.
pub const SORTINO_NO_DOWNSIDE: f64 = 10.0;

/// Annualized Sortino ratio of per-step returns against `risk_free_rate / 252`.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;

    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < daily_rf).collect();
    if downside.is_empty() {
        return SORTINO_NO_DOWNSIDE;
    }

    let downside_dev = (downside
        .iter()
        .map(|r| (r - daily_rf).powi(2))
        .sum::<f64>()
        / downside.len() as f64)
        .sqrt();
    if downside_dev > 0.0 {
        (mean - daily_rf) / downside_dev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
