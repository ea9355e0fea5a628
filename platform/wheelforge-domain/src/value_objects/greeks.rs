use serde::{Deserialize, Serialize};

/// Raw Black-Scholes sensitivities of a single long option.
///
/// `theta` is per calendar day, `theta_annual` per year. `vega` and `rho` are
/// per one percentage point move in volatility and rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub theta_annual: f64,
    pub vega: f64,
    pub rho: f64,
    pub d1: f64,
    pub d2: f64,
}
