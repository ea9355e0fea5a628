use crate::entities::metrics::{MetricsConfig, MetricsState};
use crate::entities::price_series::PriceSeries;
use crate::entities::simulation::SimulationResult;
use crate::errors::ParameterError;
use crate::services::price_series::TRADING_DAYS_PER_YEAR;
use crate::services::wheel::simulate;
use crate::value_objects::strategy_params::StrategyParameters;
use serde::Serialize;

const DAYS_PER_YEAR_ACTUAL: f64 = 365.25;

/// Wheel simulation over real bars with the summary statistics of a backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalBacktest {
    #[serde(flatten)]
    pub result: SimulationResult,
    pub max_drawdown_pct: f64,
    /// Mean over standard deviation of equity-point returns, scaled by √252.
    pub sharpe_ratio: f64,
    /// Sold contracts that expired unassigned, as a fraction of contracts sold.
    pub win_rate: f64,
    pub annualized_premium_yield_pct: f64,
    pub years_spanned: f64,
    pub equity_points: usize,
    /// Last equity point minus the first one.
    pub equity_net_profit: f64,
}

pub fn backtest(
    series: &PriceSeries,
    params: &StrategyParameters,
) -> Result<HistoricalBacktest, ParameterError> {
    let result = simulate(series, params)?;

    let metrics = MetricsState::from_points(
        MetricsConfig {
            risk_free_rate: 0.0,
            annualization_factor: Some(TRADING_DAYS_PER_YEAR),
        },
        &result.equity_history,
    );
    let summary = metrics.summary();

    let sold = result.contracts_sold();
    let win_rate = if sold == 0 {
        0.0
    } else {
        f64::from(sold - result.assignments()) / f64::from(sold)
    };

    let years_spanned =
        (series.last().date - series.first().date).num_days() as f64 / DAYS_PER_YEAR_ACTUAL;
    let annualized_premium_yield_pct = if years_spanned > 0.0 {
        result.total_premium / result.initial_cash / years_spanned * 100.0
    } else {
        0.0
    };

    Ok(HistoricalBacktest {
        max_drawdown_pct: summary.max_drawdown * 100.0,
        sharpe_ratio: summary.sharpe,
        win_rate,
        annualized_premium_yield_pct,
        years_spanned,
        equity_points: summary.points,
        equity_net_profit: summary.net_profit,
        result,
    })
}
