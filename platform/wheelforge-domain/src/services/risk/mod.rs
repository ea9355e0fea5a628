//! Risk analytics over a completed wheel simulation.
//!
//! Everything here reads the equity history and leg records of a
//! [`SimulationResult`]; nothing re-runs the simulation. Percent fields are in
//! percent, fractions (`kelly_fraction`, `win_rate`) are in `[0, 1]`.

pub mod drawdown;
pub mod kelly;
pub mod score;
pub mod sortino;
pub mod streaks;
pub mod var;

use crate::entities::simulation::SimulationResult;
use crate::value_objects::equity_point::EquityPoint;
use drawdown::{analyze_drawdowns, DrawdownPeriod};
use kelly::kelly_sizing;
use score::{composite_score, RiskFactor, RiskLabel, ScoreInputs};
use serde::Serialize;
use sortino::sortino_ratio;
use streaks::streaks;
use var::tail_risk;

pub const DEFAULT_CONFIDENCE: f64 = 0.95;
/// Equity points required before return-based statistics are reported.
pub const MIN_RISK_POINTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub confidence: f64,
    pub value_at_risk: f64,
    pub conditional_value_at_risk: f64,
    pub best_day_pct: f64,
    pub worst_day_pct: f64,
    pub sortino_ratio: f64,
    pub kelly_fraction: f64,
    pub half_kelly: f64,
    pub win_rate: f64,
    pub payoff_ratio: f64,
    pub max_drawdown_pct: f64,
    pub max_drawdown_duration_points: usize,
    pub current_drawdown_pct: f64,
    pub recent_drawdown_periods: Vec<DrawdownPeriod>,
    pub recovery_rate_pct: f64,
    pub max_win_streak: u32,
    pub max_loss_streak: u32,
    pub current_streak: i32,
    pub composite_risk_score: u32,
    pub risk_label: RiskLabel,
    pub contributing_factors: Vec<RiskFactor>,
}

/// Step returns between consecutive equity points where both values are positive.
pub fn equity_returns(equity: &[EquityPoint]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|pair| pair[0].portfolio_value > 0.0 && pair[1].portfolio_value > 0.0)
        .map(|pair| pair[1].portfolio_value / pair[0].portfolio_value - 1.0)
        .collect()
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

pub fn risk_report(result: &SimulationResult, risk_free_rate: f64, confidence: f64) -> RiskReport {
    let returns = if result.equity_history.len() >= MIN_RISK_POINTS {
        equity_returns(&result.equity_history)
    } else {
        Vec::new()
    };

    let tail = tail_risk(&returns, confidence);
    let sortino = sortino_ratio(&returns, risk_free_rate);
    let kelly = kelly_sizing(&result.legs);
    let drawdowns = analyze_drawdowns(&result.equity_history);
    let streak_stats = streaks(&result.legs);

    let score = composite_score(&ScoreInputs {
        max_drawdown_pct: drawdowns.max_drawdown_pct,
        assignment_rate_pct: result.assignment_rate() * 100.0,
        value_at_risk_pct: tail.value_at_risk,
        max_loss_streak: streak_stats.max_loss_streak,
        return_std: sample_std(&returns),
    });

    RiskReport {
        confidence,
        value_at_risk: tail.value_at_risk,
        conditional_value_at_risk: tail.conditional_value_at_risk,
        best_day_pct: tail.best_day_pct,
        worst_day_pct: tail.worst_day_pct,
        sortino_ratio: sortino,
        kelly_fraction: kelly.kelly_fraction,
        half_kelly: kelly.half_kelly,
        win_rate: kelly.win_rate,
        payoff_ratio: kelly.payoff_ratio,
        max_drawdown_pct: drawdowns.max_drawdown_pct,
        max_drawdown_duration_points: drawdowns.max_drawdown_duration_points,
        current_drawdown_pct: drawdowns.current_drawdown_pct,
        recent_drawdown_periods: drawdowns.recent_periods,
        recovery_rate_pct: drawdowns.recovery_rate_pct,
        max_win_streak: streak_stats.max_win_streak,
        max_loss_streak: streak_stats.max_loss_streak,
        current_streak: streak_stats.current_streak,
        composite_risk_score: score.score,
        risk_label: score.label,
        contributing_factors: score.factors,
    }
}
