//! Screening a live option chain for cash-secured put candidates.

use crate::services::pricing::option_price;
use crate::value_objects::option_side::OptionSide;
use crate::value_objects::strategy_params::CALENDAR_DAYS_PER_YEAR;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const MAX_CANDIDATES: usize = 5;
const DELTA_BAND: (f64, f64) = (-0.4, -0.1);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OptionQuote {
    pub side: OptionSide,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub bid: f64,
    #[serde(default)]
    pub ask: Option<f64>,
    pub delta: f64,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub open_interest: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChainSnapshot {
    pub symbol: String,
    pub underlying_price: f64,
    pub as_of: NaiveDate,
    pub contracts: Vec<OptionQuote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelCandidate {
    pub quote: OptionQuote,
    pub otm_pct: f64,
    pub days_to_expiry: i64,
    /// Bid as a yield on the strike, annualized over the days to expiry.
    pub annualized_return_pct: f64,
    /// Black-Scholes value with the quote's implied volatility, or the fallback.
    pub model_price: f64,
}

/// Out-of-the-money puts with a bid and a delta inside (-0.4, -0.1), best
/// annualized return first, at most [`MAX_CANDIDATES`].
pub fn screen_wheel_candidates(
    snapshot: &ChainSnapshot,
    risk_free_rate: f64,
    fallback_volatility: f64,
) -> Vec<WheelCandidate> {
    let spot = snapshot.underlying_price;
    if spot <= 0.0 {
        return Vec::new();
    }

    let mut candidates: Vec<WheelCandidate> = snapshot
        .contracts
        .iter()
        .filter(|quote| {
            quote.side == OptionSide::Put
                && quote.strike > 0.0
                && quote.strike < spot
                && quote.delta > DELTA_BAND.0
                && quote.delta < DELTA_BAND.1
                && quote.bid > 0.0
        })
        .map(|quote| {
            let days_to_expiry = (quote.expiration - snapshot.as_of).num_days().max(1);
            let volatility = quote
                .implied_volatility
                .filter(|iv| iv.is_finite() && *iv > 0.0)
                .unwrap_or(fallback_volatility);
            WheelCandidate {
                otm_pct: (spot - quote.strike) / spot * 100.0,
                days_to_expiry,
                annualized_return_pct: quote.bid / quote.strike * CALENDAR_DAYS_PER_YEAR
                    / days_to_expiry as f64
                    * 100.0,
                model_price: option_price(
                    spot,
                    quote.strike,
                    days_to_expiry as f64 / CALENDAR_DAYS_PER_YEAR,
                    risk_free_rate,
                    volatility,
                    OptionSide::Put,
                ),
                quote: quote.clone(),
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.annualized_return_pct
            .partial_cmp(&a.annualized_return_pct)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}
