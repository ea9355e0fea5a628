//! Black-Scholes pricing kernel.
//!
//! Prices and Greeks share one normal-CDF approximation so the two can never
//! disagree about where an option sits.

use crate::value_objects::greeks::Greeks;
use crate::value_objects::option_side::OptionSide;
use std::f64::consts::{PI, SQRT_2};

const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Standard normal CDF via the Abramowitz–Stegun 7.1.26 rational approximation of `erf`.
///
/// Antisymmetric by construction: `normal_cdf(x) + normal_cdf(-x) == 1`.
pub fn normal_cdf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs() / SQRT_2;
    let t = 1.0 / (1.0 + P * z);
    let y = 1.0 - ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t * (-z * z).exp();
    0.5 * (1.0 + sign * y)
}

pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Inputs for which no meaningful price exists: expired or zero-volatility
/// contracts, and non-positive spot or strike.
pub fn is_degenerate(spot: f64, strike: f64, time_to_expiry: f64, volatility: f64) -> bool {
    time_to_expiry <= 0.0 || volatility <= 0.0 || spot <= 0.0 || strike <= 0.0
}

fn d1_d2(spot: f64, strike: f64, time_to_expiry: f64, rate: f64, volatility: f64) -> (f64, f64) {
    let sqrt_t = time_to_expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * time_to_expiry)
        / (volatility * sqrt_t);
    (d1, d1 - volatility * sqrt_t)
}

/// Black-Scholes value of a European option; 0 for degenerate inputs.
pub fn option_price(
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
    volatility: f64,
    side: OptionSide,
) -> f64 {
    if is_degenerate(spot, strike, time_to_expiry, volatility) {
        return 0.0;
    }

    let (d1, d2) = d1_d2(spot, strike, time_to_expiry, rate, volatility);
    let discounted_strike = strike * (-rate * time_to_expiry).exp();
    let value = match side {
        OptionSide::Call => spot * normal_cdf(d1) - discounted_strike * normal_cdf(d2),
        OptionSide::Put => discounted_strike * normal_cdf(-d2) - spot * normal_cdf(-d1),
    };
    value.max(0.0)
}

/// Greeks of a long option. Deltas are raw (puts negative); all zero for degenerate inputs.
pub fn option_greeks(
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    rate: f64,
    volatility: f64,
    side: OptionSide,
) -> Greeks {
    if is_degenerate(spot, strike, time_to_expiry, volatility) {
        return Greeks::default();
    }

    let sqrt_t = time_to_expiry.sqrt();
    let (d1, d2) = d1_d2(spot, strike, time_to_expiry, rate, volatility);
    let pdf_d1 = normal_pdf(d1);
    let discounted_strike = strike * (-rate * time_to_expiry).exp();
    let decay = -spot * pdf_d1 * volatility / (2.0 * sqrt_t);

    let (delta, theta_annual, rho) = match side {
        OptionSide::Call => (
            normal_cdf(d1),
            decay - rate * discounted_strike * normal_cdf(d2),
            discounted_strike * time_to_expiry * normal_cdf(d2) / 100.0,
        ),
        OptionSide::Put => (
            normal_cdf(d1) - 1.0,
            decay + rate * discounted_strike * normal_cdf(-d2),
            -discounted_strike * time_to_expiry * normal_cdf(-d2) / 100.0,
        ),
    };

    Greeks {
        delta,
        gamma: pdf_d1 / (spot * volatility * sqrt_t),
        theta: theta_annual / 365.0,
        theta_annual,
        vega: spot * pdf_d1 * sqrt_t / 100.0,
        rho,
        d1,
        d2,
    }
}
