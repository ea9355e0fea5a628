use super::executor::{execute_indexed, ExecutionLimits};
use super::{averaged_runs, emit_progress, sort_by_wheel_return, OptimizerProgress, RunTotals};
use crate::config::{Config, DEFAULT_OPTIMIZER_DAYS};
use crate::shared::record_use_case_metrics;
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Instant;
use wheelforge_domain::value_objects::instrument::InstrumentProfile;

/// One instrument's averages under fixed strategy parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentComparison {
    pub symbol: String,
    pub name: String,
    pub wheel_return: f64,
    pub buy_hold_return: f64,
    pub alpha: f64,
    pub avg_premium: f64,
    pub put_assignment_rate: f64,
    pub call_assignment_rate: f64,
    pub avg_trades: f64,
}

pub fn compare_instruments(
    config: &Config,
    as_of: NaiveDate,
) -> Result<Vec<InstrumentComparison>, String> {
    compare_instruments_with_hooks(config, as_of, None, None)
}

/// Runs the configured strategy `runs_per_cell` times per instrument and
/// sorts by averaged wheel return. Like the grid search, these are noisy
/// estimates.
pub fn compare_instruments_with_hooks(
    config: &Config,
    as_of: NaiveDate,
    mut on_progress: Option<&mut dyn FnMut(OptimizerProgress)>,
    should_cancel: Option<&(dyn Fn() -> bool + Sync)>,
) -> Result<Vec<InstrumentComparison>, String> {
    let symbols: Vec<String> = config
        .instruments()
        .iter()
        .map(|symbol| symbol.trim().to_uppercase())
        .collect();
    let span = tracing::info_span!("app.compare", instruments = symbols.len());
    let _enter = span.enter();
    let start = Instant::now();

    let result = compare(config, &symbols, as_of, &mut on_progress, should_cancel);
    record_use_case_metrics("compare", start, &result);
    result
}

fn compare(
    config: &Config,
    symbols: &[String],
    as_of: NaiveDate,
    on_progress: &mut Option<&mut dyn FnMut(OptimizerProgress)>,
    should_cancel: Option<&(dyn Fn() -> bool + Sync)>,
) -> Result<Vec<InstrumentComparison>, String> {
    config.validate()?;
    let params = config.strategy_parameters();
    let runs = config.runs_per_cell();
    let seed = config.run.seed;

    let mut progress = OptimizerProgress {
        total: symbols.len(),
        completed: 0,
        last_label: None,
    };
    emit_progress(on_progress, &progress);

    let job = |idx: usize| -> Result<InstrumentComparison, String> {
        let symbol = &symbols[idx];
        let totals = averaged_runs(symbol, &params, runs, seed, idx, DEFAULT_OPTIMIZER_DAYS, as_of)?;
        Ok(comparison_row(symbol, &totals))
    };

    let limits = ExecutionLimits::new(config.parallelism(), config.time_budget(), should_cancel);
    let mut rows = execute_indexed(symbols.len(), limits, &job, &mut |_, row: &InstrumentComparison| {
        progress.completed += 1;
        progress.last_label = Some(row.symbol.clone());
        emit_progress(on_progress, &progress);
    })?;
    sort_by_wheel_return(&mut rows, |row| row.wheel_return);
    Ok(rows)
}

fn comparison_row(symbol: &str, totals: &RunTotals) -> InstrumentComparison {
    InstrumentComparison {
        symbol: symbol.to_string(),
        name: InstrumentProfile::lookup(symbol).name,
        wheel_return: totals.mean(totals.wheel_return),
        buy_hold_return: totals.mean(totals.buy_hold_return),
        alpha: totals.mean(totals.wheel_return - totals.buy_hold_return),
        avg_premium: totals.mean(totals.premium),
        put_assignment_rate: RunTotals::rate_pct(totals.puts_assigned, totals.puts_sold),
        call_assignment_rate: RunTotals::rate_pct(totals.calls_assigned, totals.calls_sold),
        avg_trades: totals.mean(f64::from(totals.trades())),
    }
}

#[cfg(test)]
mod tests {
    use super::compare_instruments;
    use crate::config::Config;
    use chrono::NaiveDate;

    fn config(instruments: &str) -> Config {
        toml::from_str(&format!(
            r#"
[run]
symbol = "SPY"
seed = 5

[strategy]
days_to_expiry = 14

[optimizer]
instruments = {instruments}
parallelism = 3
"#
        ))
        .expect("config")
    }

    #[test]
    fn comparison_covers_each_instrument_sorted() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).expect("date");
        let rows =
            compare_instruments(&config(r#"["spy", "TSLA", "NVDA", "ZZZZ"]"#), as_of).expect("compare");
        assert_eq!(rows.len(), 4);
        assert!(rows.windows(2).all(|w| w[0].wheel_return >= w[1].wheel_return));
        let tsla = rows.iter().find(|r| r.symbol == "TSLA").expect("tsla row");
        assert_eq!(tsla.name, "Tesla Inc.");
        assert!(rows.iter().any(|r| r.symbol == "SPY"));
        for row in &rows {
            assert!((0.0..=100.0).contains(&row.put_assignment_rate));
            assert!((0.0..=100.0).contains(&row.call_assignment_rate));
            assert!(row.avg_trades > 0.0);
        }
    }

    #[test]
    fn comparison_is_reproducible_for_a_seed() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).expect("date");
        let cfg = config(r#"["AAPL", "MSFT"]"#);
        assert_eq!(
            compare_instruments(&cfg, as_of).expect("a"),
            compare_instruments(&cfg, as_of).expect("b")
        );
    }
}
