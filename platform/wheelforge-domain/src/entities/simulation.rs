use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::option_side::OptionSide;
use crate::value_objects::trade::Trade;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegOutcome {
    Expired,
    Assigned,
}

/// One completed short-option leg, from sale to expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegRecord {
    pub side: OptionSide,
    pub opened: NaiveDate,
    pub expired: NaiveDate,
    pub strike: f64,
    pub premium: f64,
    pub underlying_at_open: f64,
    pub underlying_at_expiry: f64,
    pub outcome: LegOutcome,
}

impl LegRecord {
    pub fn is_assigned(&self) -> bool {
        self.outcome == LegOutcome::Assigned
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub wheel: f64,
    pub buy_hold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_cash: f64,
    pub final_value: f64,
    pub buy_hold_final_value: f64,
    pub wheel_return_pct: f64,
    pub buy_hold_return_pct: f64,
    pub total_premium: f64,
    pub puts_sold: u32,
    pub calls_sold: u32,
    pub puts_assigned: u32,
    pub calls_assigned: u32,
    pub final_cash: f64,
    pub final_shares: u64,
    pub equity_history: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub legs: Vec<LegRecord>,
    pub comparison_series: Vec<ComparisonPoint>,
}

impl SimulationResult {
    pub fn contracts_sold(&self) -> u32 {
        self.puts_sold + self.calls_sold
    }

    pub fn assignments(&self) -> u32 {
        self.puts_assigned + self.calls_assigned
    }

    /// Assigned legs as a fraction of sold legs; 0 when nothing was sold.
    pub fn assignment_rate(&self) -> f64 {
        let sold = self.contracts_sold();
        if sold == 0 {
            0.0
        } else {
            f64::from(self.assignments()) / f64::from(sold)
        }
    }

    pub fn alpha_pct(&self) -> f64 {
        self.wheel_return_pct - self.buy_hold_return_pct
    }
}
