use crate::entities::price_series::PriceSeries;
use crate::services::price_series::{gbm_step, round_cents, standard_normal};
use crate::services::pricing::{normal_cdf, option_price};
use crate::value_objects::option_side::OptionSide;
use crate::value_objects::strategy_params::StrategyParameters;
use rand::Rng;
use serde::Serialize;

pub const DEFAULT_PATHS: usize = 1_000;
pub const HISTOGRAM_BUCKETS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Near-term outlook for the next wheel leg opened at the last close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub current_price: f64,
    /// Linear-trend close `days_to_expiry` bars past the last one.
    pub predicted_price: f64,
    pub trend_slope: f64,
    pub put_strike: f64,
    pub call_strike: f64,
    pub put_assignment_probability: f64,
    pub call_assignment_probability: f64,
    pub put_premium: f64,
    pub call_premium: f64,
    pub paths: usize,
    /// Sorted simulated closes at expiry.
    pub scenarios: Vec<f64>,
    pub distribution: Vec<DistributionBucket>,
    pub percentiles: Percentiles,
}

/// Ordinary least squares fit of close against bar index: `(slope, intercept)`.
pub fn linear_trend(closes: &[f64]) -> (f64, f64) {
    let n = closes.len() as f64;
    if closes.is_empty() {
        return (0.0, 0.0);
    }
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, close) in closes.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += close;
        sum_xy += x * close;
        sum_x2 += x * x;
    }
    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return (0.0, sum_y / n);
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    (slope, (sum_y - slope * sum_x) / n)
}

/// Risk-neutral probability that `side` finishes in the money at `strike`.
///
/// Without volatility or time the outcome is decided by where spot already sits.
pub fn assignment_probability(
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
    volatility: f64,
    side: OptionSide,
) -> f64 {
    if time_to_expiry <= 0.0 || volatility <= 0.0 || spot <= 0.0 || strike <= 0.0 {
        return if side.is_assigned(strike, spot) { 1.0 } else { 0.0 };
    }
    let z = ((strike / spot).ln() - (rate - 0.5 * volatility * volatility) * time_to_expiry)
        / (volatility * time_to_expiry.sqrt());
    match side {
        OptionSide::Put => normal_cdf(z),
        OptionSide::Call => 1.0 - normal_cdf(z),
    }
}

/// Equal-width histogram over `[min, max]`; the last bucket includes `max`.
pub fn histogram(sorted: &[f64], buckets: usize) -> Vec<DistributionBucket> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if buckets == 0 {
        return Vec::new();
    }
    let width = (max - min) / buckets as f64;
    let mut out: Vec<DistributionBucket> = (0..buckets)
        .map(|b| DistributionBucket {
            lo: min + b as f64 * width,
            hi: min + (b + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for value in sorted {
        let slot = if width > 0.0 {
            (((value - min) / width) as usize).min(buckets - 1)
        } else {
            0
        };
        out[slot].count += 1;
    }
    out
}

/// Value at rank `floor(p * n)` of an ascending sample, clamped to the last element.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

pub fn predict<R: Rng + ?Sized>(
    series: &PriceSeries,
    params: &StrategyParameters,
    paths: usize,
    rng: &mut R,
) -> Prediction {
    let closes: Vec<f64> = series.closes().collect();
    let current_price = series.last().close;
    let volatility = series.volatility();
    let drift = series.drift();
    let time_to_expiry = params.time_to_expiry_years();
    let rate = params.risk_free_rate;

    let (slope, intercept) = linear_trend(&closes);
    let horizon = (closes.len() - 1) as f64 + f64::from(params.days_to_expiry);
    let predicted_price = slope * horizon + intercept;

    let put_strike = OptionSide::Put.otm_strike(current_price, params.otm_pct);
    let call_strike = OptionSide::Call.otm_strike(current_price, params.otm_pct);
    let multiplier = params.contract_multiplier();

    let mut scenarios: Vec<f64> = (0..paths)
        .map(|_| {
            let mut price = current_price;
            for _ in 0..params.days_to_expiry {
                price = gbm_step(price, drift, volatility, standard_normal(rng));
            }
            round_cents(price)
        })
        .collect();
    scenarios.sort_by(|a, b| a.total_cmp(b));

    let percentiles = Percentiles {
        p10: percentile(&scenarios, 0.10),
        p25: percentile(&scenarios, 0.25),
        p50: percentile(&scenarios, 0.50),
        p75: percentile(&scenarios, 0.75),
        p90: percentile(&scenarios, 0.90),
    };

    Prediction {
        current_price,
        predicted_price,
        trend_slope: slope,
        put_strike,
        call_strike,
        put_assignment_probability: assignment_probability(
            current_price,
            put_strike,
            time_to_expiry,
            rate,
            volatility,
            OptionSide::Put,
        ),
        call_assignment_probability: assignment_probability(
            current_price,
            call_strike,
            time_to_expiry,
            rate,
            volatility,
            OptionSide::Call,
        ),
        put_premium: option_price(
            current_price,
            put_strike,
            time_to_expiry,
            rate,
            volatility,
            OptionSide::Put,
        ) * multiplier,
        call_premium: option_price(
            current_price,
            call_strike,
            time_to_expiry,
            rate,
            volatility,
            OptionSide::Call,
        ) * multiplier,
        paths,
        distribution: histogram(&scenarios, HISTOGRAM_BUCKETS),
        scenarios,
        percentiles,
    }
}
