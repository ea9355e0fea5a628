//! Grid search over strike distance and days to expiry, plus the
//! multi-instrument comparator.
//!
//! Every cell is scored on freshly generated synthetic series, so the
//! averages are noisy estimates rather than guarantees: reseeding changes the
//! magnitudes and can reorder close cells. Reports carry the seed and the
//! number of runs per cell for that reason.

mod compare;
mod executor;

pub use compare::{compare_instruments, compare_instruments_with_hooks, InstrumentComparison};

use crate::config::{Config, DEFAULT_DAYS_TO_EXPIRY, DEFAULT_OPTIMIZER_DAYS, DEFAULT_OTM_PCTS};
use crate::market::synthetic_series;
use crate::shared::{job_rng, record_use_case_metrics};
use chrono::NaiveDate;
use executor::{execute_indexed, CancelHook, ExecutionLimits};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use wheelforge_domain::entities::simulation::SimulationResult;
use wheelforge_domain::services::wheel::simulate;
use wheelforge_domain::value_objects::strategy_params::StrategyParameters;

/// Ordered axes of the search; cells enumerate OTM-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterGrid {
    pub otm_pcts: Vec<f64>,
    pub days_to_expiry: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    pub otm_pct: f64,
    pub days_to_expiry: u32,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            otm_pcts: DEFAULT_OTM_PCTS.to_vec(),
            days_to_expiry: DEFAULT_DAYS_TO_EXPIRY.to_vec(),
        }
    }
}

impl ParameterGrid {
    pub fn from_config(config: &Config) -> Self {
        Self {
            otm_pcts: config.otm_pcts(),
            days_to_expiry: config.optimizer_days_to_expiry(),
        }
    }

    pub fn len(&self) -> usize {
        self.otm_pcts.len().saturating_mul(self.days_to_expiry.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cells(&self) -> Vec<GridCell> {
        let mut out = Vec::with_capacity(self.len());
        for &otm_pct in &self.otm_pcts {
            for &days_to_expiry in &self.days_to_expiry {
                out.push(GridCell {
                    otm_pct,
                    days_to_expiry,
                });
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    pub runs_per_cell: usize,
    pub parallelism: usize,
    pub seed: Option<u64>,
    /// Calendar days per synthetic series.
    pub history_days: u32,
    pub time_budget: Option<Duration>,
    pub as_of: NaiveDate,
}

impl OptimizerSettings {
    pub fn from_config(config: &Config, as_of: NaiveDate) -> Self {
        Self {
            runs_per_cell: config.runs_per_cell(),
            parallelism: config.parallelism(),
            seed: config.run.seed,
            history_days: DEFAULT_OPTIMIZER_DAYS,
            time_budget: config.time_budget(),
            as_of,
        }
    }
}

/// Averages over `runs_per_cell` runs of one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellResult {
    pub otm_pct: f64,
    pub days_to_expiry: u32,
    pub wheel_return: f64,
    pub buy_hold_return: f64,
    pub alpha: f64,
    pub avg_premium: f64,
    pub avg_put_assignments: f64,
    pub avg_call_assignments: f64,
    pub avg_trades: f64,
    pub premium_per_trade: f64,
    /// Assignments as a percentage of contracts sold, over all runs.
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub symbol: String,
    pub seed: Option<u64>,
    pub runs_per_cell: usize,
    pub parameters: StrategyParameters,
    /// Best averaged wheel return first.
    pub cells: Vec<CellResult>,
}

impl OptimizationReport {
    pub fn best(&self) -> Option<&CellResult> {
        self.cells.first()
    }
}

#[derive(Debug, Clone)]
pub struct OptimizerProgress {
    pub total: usize,
    pub completed: usize,
    pub last_label: Option<String>,
}

/// Sums over repeated simulations of one configuration.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RunTotals {
    pub runs: usize,
    pub wheel_return: f64,
    pub buy_hold_return: f64,
    pub premium: f64,
    pub puts_sold: u32,
    pub calls_sold: u32,
    pub puts_assigned: u32,
    pub calls_assigned: u32,
}

impl RunTotals {
    pub fn add(&mut self, result: &SimulationResult) {
        self.runs += 1;
        self.wheel_return += result.wheel_return_pct;
        self.buy_hold_return += result.buy_hold_return_pct;
        self.premium += result.total_premium;
        self.puts_sold += result.puts_sold;
        self.calls_sold += result.calls_sold;
        self.puts_assigned += result.puts_assigned;
        self.calls_assigned += result.calls_assigned;
    }

    pub fn mean(&self, total: f64) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            total / self.runs as f64
        }
    }

    pub fn trades(&self) -> u32 {
        self.puts_sold + self.calls_sold
    }

    /// `part / whole × 100` with the whole floored at 1.
    pub fn rate_pct(part: u32, whole: u32) -> f64 {
        f64::from(part) / f64::from(whole.max(1)) * 100.0
    }
}

/// Simulates `params` on `runs` synthetic series drawn from one job RNG.
pub(crate) fn averaged_runs(
    symbol: &str,
    params: &StrategyParameters,
    runs: usize,
    seed: Option<u64>,
    job_index: usize,
    history_days: u32,
    as_of: NaiveDate,
) -> Result<RunTotals, String> {
    let mut rng = job_rng(seed, job_index);
    let mut totals = RunTotals::default();
    for _ in 0..runs {
        let series = synthetic_series(symbol, history_days, as_of, &mut rng)?;
        let result = simulate(&series, params)
            .map_err(|err| format!("invalid strategy parameters: {err}"))?;
        totals.add(&result);
    }
    Ok(totals)
}

pub(crate) fn sort_by_wheel_return<T>(rows: &mut [T], key: impl Fn(&T) -> f64) {
    // sort_by is stable, ties keep enumeration order
    rows.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}

fn cell_result(cell: GridCell, totals: &RunTotals) -> CellResult {
    let trades = totals.trades();
    let assignments = totals.puts_assigned + totals.calls_assigned;
    CellResult {
        otm_pct: cell.otm_pct,
        days_to_expiry: cell.days_to_expiry,
        wheel_return: totals.mean(totals.wheel_return),
        buy_hold_return: totals.mean(totals.buy_hold_return),
        alpha: totals.mean(totals.wheel_return - totals.buy_hold_return),
        avg_premium: totals.mean(totals.premium),
        avg_put_assignments: totals.mean(f64::from(totals.puts_assigned)),
        avg_call_assignments: totals.mean(f64::from(totals.calls_assigned)),
        avg_trades: totals.mean(f64::from(trades)),
        premium_per_trade: totals.premium / f64::from(trades.max(1)),
        risk_score: RunTotals::rate_pct(assignments, trades),
    }
}

pub fn optimize(config: &Config, as_of: NaiveDate) -> Result<OptimizationReport, String> {
    optimize_with_hooks(config, as_of, None, None)
}

pub fn optimize_with_hooks(
    config: &Config,
    as_of: NaiveDate,
    mut on_progress: Option<&mut dyn FnMut(OptimizerProgress)>,
    should_cancel: Option<&(dyn Fn() -> bool + Sync)>,
) -> Result<OptimizationReport, String> {
    let symbol = config.symbol();
    let grid = ParameterGrid::from_config(config);
    let settings = OptimizerSettings::from_config(config, as_of);
    let span = tracing::info_span!(
        "app.optimize",
        symbol = %symbol,
        cells = grid.len(),
        runs_per_cell = settings.runs_per_cell,
        parallelism = settings.parallelism
    );
    let _enter = span.enter();
    let start = Instant::now();

    let result = run_grid(config, &symbol, &grid, &settings, &mut on_progress, should_cancel);

    record_use_case_metrics("optimize", start, &result);
    result
}

fn run_grid(
    config: &Config,
    symbol: &str,
    grid: &ParameterGrid,
    settings: &OptimizerSettings,
    on_progress: &mut Option<&mut dyn FnMut(OptimizerProgress)>,
    should_cancel: CancelHook<'_>,
) -> Result<OptimizationReport, String> {
    config.validate()?;
    let params = config.strategy_parameters();
    let cells = grid.cells();
    let mut progress = OptimizerProgress {
        total: cells.len(),
        completed: 0,
        last_label: None,
    };
    emit_progress(on_progress, &progress);

    let job = |idx: usize| -> Result<CellResult, String> {
        let cell = cells[idx];
        let cell_params = params.with_grid_point(cell.otm_pct, cell.days_to_expiry);
        let totals = averaged_runs(
            symbol,
            &cell_params,
            settings.runs_per_cell,
            settings.seed,
            idx,
            settings.history_days,
            settings.as_of,
        )?;
        let row = cell_result(cell, &totals);
        tracing::debug!(
            otm_pct = cell.otm_pct,
            days_to_expiry = cell.days_to_expiry,
            wheel_return = row.wheel_return,
            "cell evaluated"
        );
        Ok(row)
    };

    let limits = ExecutionLimits::new(settings.parallelism, settings.time_budget, should_cancel);
    let mut rows = execute_indexed(cells.len(), limits, &job, &mut |_, row: &CellResult| {
        metrics::counter!("wheelforge.optimizer.cells_total").increment(1);
        progress.completed += 1;
        progress.last_label = Some(format!(
            "otm={:.0}% dte={}",
            row.otm_pct * 100.0,
            row.days_to_expiry
        ));
        emit_progress(on_progress, &progress);
    })?;
    sort_by_wheel_return(&mut rows, |row| row.wheel_return);

    if let Some(best) = rows.first() {
        metrics::gauge!("wheelforge.optimizer.best_wheel_return").set(best.wheel_return);
        tracing::info!(
            otm_pct = best.otm_pct,
            days_to_expiry = best.days_to_expiry,
            wheel_return = best.wheel_return,
            "optimizer finished"
        );
    }

    Ok(OptimizationReport {
        symbol: symbol.to_string(),
        seed: settings.seed,
        runs_per_cell: settings.runs_per_cell,
        parameters: params,
        cells: rows,
    })
}

pub(crate) fn emit_progress(
    on_progress: &mut Option<&mut dyn FnMut(OptimizerProgress)>,
    progress: &OptimizerProgress,
) {
    if let Some(callback) = on_progress.as_mut() {
        (callback)(progress.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("date")
    }

    fn small_config(parallelism: usize) -> Config {
        let toml_str = format!(
            r#"
[run]
symbol = "AAPL"
seed = 21

[optimizer]
otm_pcts = [0.03, 0.06]
days_to_expiry = [7, 21, 30]
runs_per_cell = 2
parallelism = {parallelism}
"#
        );
        toml::from_str(&toml_str).expect("config")
    }

    #[test]
    fn default_grid_is_eight_by_eight() {
        let grid = ParameterGrid::default();
        assert_eq!(grid.len(), 64);
        let cells = grid.cells();
        assert_eq!(cells[0], GridCell { otm_pct: 0.02, days_to_expiry: 3 });
        assert_eq!(cells[1], GridCell { otm_pct: 0.02, days_to_expiry: 5 });
        assert_eq!(cells[63], GridCell { otm_pct: 0.10, days_to_expiry: 45 });
    }

    #[test]
    fn cells_are_sorted_by_wheel_return() {
        let report = optimize(&small_config(1), as_of()).expect("optimize");
        assert_eq!(report.cells.len(), 6);
        assert!(report
            .cells
            .windows(2)
            .all(|w| w[0].wheel_return >= w[1].wheel_return));
        for cell in &report.cells {
            assert!((cell.alpha - (cell.wheel_return - cell.buy_hold_return)).abs() < 1e-9);
            assert!((0.0..=100.0).contains(&cell.risk_score));
        }
        assert_eq!(report.best(), report.cells.first());
    }

    #[test]
    fn parallel_and_serial_runs_agree_for_a_seed() {
        let serial = optimize(&small_config(1), as_of()).expect("serial");
        let parallel = optimize(&small_config(4), as_of()).expect("parallel");
        assert_eq!(serial, parallel);
    }

    #[test]
    fn reseeding_keeps_cell_coordinates() {
        let a = optimize(&small_config(1), as_of()).expect("a");
        let mut config = small_config(1);
        config.run.seed = Some(22);
        let b = optimize(&config, as_of()).expect("b");
        let coords = |r: &OptimizationReport| {
            let mut v: Vec<(u64, u32)> = r
                .cells
                .iter()
                .map(|c| ((c.otm_pct * 1e4).round() as u64, c.days_to_expiry))
                .collect();
            v.sort();
            v
        };
        assert_eq!(coords(&a), coords(&b));
    }

    #[test]
    fn progress_reports_every_cell_and_cancel_stops() {
        let mut updates = Vec::new();
        let mut on_progress = |p: OptimizerProgress| updates.push(p.completed);
        optimize_with_hooks(&small_config(1), as_of(), Some(&mut on_progress), None)
            .expect("optimize");
        assert_eq!(updates, vec![0, 1, 2, 3, 4, 5, 6]);

        let cancel = || true;
        let err = optimize_with_hooks(&small_config(2), as_of(), None, Some(&cancel))
            .expect_err("cancelled");
        assert_eq!(err, "cancelled");
    }

    #[test]
    fn stable_sort_keeps_enumeration_order_on_ties() {
        let mut rows = vec![(0, 1.0), (1, 2.0), (2, 1.0), (3, 2.0)];
        sort_by_wheel_return(&mut rows, |r| r.1);
        let order: Vec<i32> = rows.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }
}
