use crate::errors::ParameterError;
use serde::{Deserialize, Serialize};

pub const SHARES_PER_CONTRACT: u64 = 100;
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyParameters {
    pub initial_cash: f64,
    /// Out-of-the-money distance as a fraction of spot.
    pub otm_pct: f64,
    pub days_to_expiry: u32,
    pub risk_free_rate: f64,
    pub contracts: u32,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            initial_cash: 50_000.0,
            otm_pct: 0.05,
            days_to_expiry: 30,
            risk_free_rate: 0.05,
            contracts: 1,
        }
    }
}

impl StrategyParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(ParameterError::InitialCash(self.initial_cash));
        }
        if !(self.otm_pct > 0.0 && self.otm_pct < 1.0) {
            return Err(ParameterError::OtmPct(self.otm_pct));
        }
        if self.days_to_expiry < 1 {
            return Err(ParameterError::DaysToExpiry);
        }
        if self.contracts < 1 {
            return Err(ParameterError::Contracts);
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ParameterError::RiskFreeRate(self.risk_free_rate));
        }
        Ok(())
    }

    pub fn shares_per_assignment(&self) -> u64 {
        SHARES_PER_CONTRACT * u64::from(self.contracts)
    }

    /// Premium multiplier applied to a per-share option price.
    pub fn contract_multiplier(&self) -> f64 {
        self.shares_per_assignment() as f64
    }

    pub fn time_to_expiry_years(&self) -> f64 {
        f64::from(self.days_to_expiry) / CALENDAR_DAYS_PER_YEAR
    }

    pub fn with_grid_point(&self, otm_pct: f64, days_to_expiry: u32) -> Self {
        Self {
            otm_pct,
            days_to_expiry,
            ..*self
        }
    }
}
