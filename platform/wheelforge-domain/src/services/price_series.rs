use crate::entities::price_series::PriceSeries;
use crate::errors::SeriesError;
use crate::value_objects::instrument::InstrumentProfile;
use crate::value_objects::price_bar::PriceBar;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use std::f64::consts::PI;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const FALLBACK_VOLATILITY: f64 = 0.30;
pub const FALLBACK_DRIFT: f64 = 0.08;
/// Minimum bar count for a drift estimate, and for historical data to be used at all.
pub const MIN_HISTORY_BARS: usize = 20;

const DAYS_PER_YEAR_ACTUAL: f64 = 365.25;

/// One standard normal draw (Box–Muller, cosine branch).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); shift away from 0 so ln() stays finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// One trading-day geometric Brownian motion step.
pub fn gbm_step(price: f64, drift: f64, volatility: f64, z: f64) -> f64 {
    let dt = 1.0 / TRADING_DAYS_PER_YEAR;
    price * ((drift - 0.5 * volatility * volatility) * dt + volatility * dt.sqrt() * z).exp()
}

/// Synthetic weekday series covering `end - days ..= end`.
///
/// The first bar is one GBM step away from `profile.spot`. Closes are stored
/// rounded to cents, the walk itself is unrounded.
pub fn generate_synthetic<R: Rng + ?Sized>(
    profile: &InstrumentProfile,
    days: u32,
    end: NaiveDate,
    rng: &mut R,
) -> Result<PriceSeries, SeriesError> {
    let start = end - Duration::days(i64::from(days));
    let mut price = profile.spot;
    let mut bars = Vec::with_capacity(days as usize);

    let mut date = start;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let z = standard_normal(rng);
            price = gbm_step(price, profile.annual_drift, profile.annual_volatility, z);
            bars.push(PriceBar::close_only(date, round_cents(price)));
        }
        date += Duration::days(1);
    }

    PriceSeries::new(bars, profile.annual_volatility, profile.annual_drift)
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Log returns of consecutive closes; pairs with a non-positive close are skipped.
pub fn log_returns(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .filter(|pair| pair[0].close > 0.0 && pair[1].close > 0.0)
        .map(|pair| (pair[1].close / pair[0].close).ln())
        .collect()
}

/// Annualized sample standard deviation of log returns over the last `window` bars.
pub fn historical_volatility(bars: &[PriceBar], window: Option<usize>) -> f64 {
    let tail = match window {
        Some(window) if window < bars.len() => &bars[bars.len() - window..],
        _ => bars,
    };
    let returns = log_returns(tail);
    if returns.len() < 2 {
        return FALLBACK_VOLATILITY;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Continuously compounded annual drift between the first and last close.
pub fn historical_drift(bars: &[PriceBar]) -> f64 {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return FALLBACK_DRIFT;
    };
    if bars.len() < MIN_HISTORY_BARS || first.close <= 0.0 || last.close <= 0.0 {
        return FALLBACK_DRIFT;
    }

    let years = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR_ACTUAL;
    if years <= 0.0 {
        return FALLBACK_DRIFT;
    }
    (last.close / first.close).ln() / years
}

/// Builds a series from real bars with fitted volatility and drift.
pub fn fit_historical(
    bars: Vec<PriceBar>,
    volatility_window: Option<usize>,
) -> Result<PriceSeries, SeriesError> {
    let volatility = historical_volatility(&bars, volatility_window);
    let drift = historical_drift(&bars);
    PriceSeries::new(bars, volatility, drift)
}
