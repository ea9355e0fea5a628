//! Single-instrument use cases. Each resolves a price series (historical
//! when a repository has enough bars, synthetic otherwise), runs one domain
//! service, and reports where the series came from.

use crate::config::Config;
use crate::market::{resolve_series, ResolvedSeries, SeriesRequest};
use crate::shared::{record_use_case_metrics, seeded_rng};
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Instant;
use wheelforge_domain::entities::simulation::SimulationResult;
use wheelforge_domain::repositories::market_data::MarketDataRepository;
use wheelforge_domain::services::backtest::{backtest, HistoricalBacktest};
use wheelforge_domain::services::chain::{screen_wheel_candidates, ChainSnapshot, WheelCandidate};
use wheelforge_domain::services::exposure::{pnl_scenarios, wheel_greeks, PnlProfile, WheelGreeks};
use wheelforge_domain::services::playbook::{preset, PresetStrategy};
use wheelforge_domain::services::prediction::{predict, Prediction};
use wheelforge_domain::services::price_series::FALLBACK_VOLATILITY;
use wheelforge_domain::services::pricing::option_price;
use wheelforge_domain::services::risk::{risk_report, RiskReport};
use wheelforge_domain::services::wheel::simulate;
use wheelforge_domain::value_objects::option_side::OptionSide;
use wheelforge_domain::value_objects::strategy_params::{StrategyParameters, SHARES_PER_CONTRACT};

/// Provenance shared by every single-instrument report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSource {
    pub symbol: String,
    pub historical: bool,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub volatility: f64,
    pub drift: f64,
}

impl From<&ResolvedSeries> for SeriesSource {
    fn from(resolved: &ResolvedSeries) -> Self {
        Self {
            symbol: resolved.symbol.clone(),
            historical: resolved.historical,
            bars: resolved.series.len(),
            first_date: resolved.series.first().date,
            last_date: resolved.series.last().date,
            volatility: resolved.series.volatility(),
            drift: resolved.series.drift(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub source: SeriesSource,
    pub parameters: StrategyParameters,
    pub result: SimulationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub source: SeriesSource,
    pub parameters: StrategyParameters,
    pub backtest: HistoricalBacktest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub source: SeriesSource,
    pub parameters: StrategyParameters,
    pub prediction: Prediction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskRun {
    pub source: SeriesSource,
    pub parameters: StrategyParameters,
    pub wheel_return_pct: f64,
    pub buy_hold_return_pct: f64,
    pub contracts_sold: u32,
    pub risk: RiskReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreeksReport {
    pub source: SeriesSource,
    pub parameters: StrategyParameters,
    pub greeks: WheelGreeks,
    pub put_pnl: PnlProfile,
    pub call_pnl: PnlProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainScreen {
    pub symbol: String,
    pub underlying_price: f64,
    pub as_of: NaiveDate,
    pub quotes: usize,
    pub candidates: Vec<WheelCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetRun {
    pub strategy: &'static PresetStrategy,
    pub simulation: SimulationReport,
    pub risk: RiskReport,
}

/// Everything a use case needs besides the configuration.
#[derive(Clone, Copy)]
pub struct UseCaseEnv<'a> {
    pub market_data: Option<&'a dyn MarketDataRepository>,
    /// Last date of a synthetic series.
    pub as_of: NaiveDate,
}

impl<'a> UseCaseEnv<'a> {
    pub fn new(market_data: Option<&'a dyn MarketDataRepository>) -> Self {
        Self {
            market_data,
            as_of: crate::shared::today(),
        }
    }
}

fn prepare(
    config: &Config,
    env: UseCaseEnv<'_>,
    rng: &mut rand::rngs::StdRng,
) -> Result<(ResolvedSeries, StrategyParameters), String> {
    config.validate()?;
    let params = config.strategy_parameters();
    let symbol = config.symbol();
    let resolved = resolve_series(
        env.market_data,
        SeriesRequest {
            symbol: &symbol,
            history_days: config.history_days(),
            volatility_window: config.volatility_window(),
            end: env.as_of,
        },
        rng,
    )?;
    Ok((resolved, params))
}

fn simulate_resolved(
    resolved: &ResolvedSeries,
    params: &StrategyParameters,
) -> Result<SimulationResult, String> {
    simulate(&resolved.series, params).map_err(|err| format!("invalid strategy parameters: {err}"))
}

pub fn run_simulate(config: &Config, env: UseCaseEnv<'_>) -> Result<SimulationReport, String> {
    let span = tracing::info_span!("app.simulate", symbol = %config.symbol());
    let _enter = span.enter();
    let start = Instant::now();

    let result = simulate_use_case(config, env);
    record_use_case_metrics("simulate", start, &result);
    result
}

fn simulate_use_case(config: &Config, env: UseCaseEnv<'_>) -> Result<SimulationReport, String> {
    let mut rng = seeded_rng(config.run.seed);
    let (resolved, params) = prepare(config, env, &mut rng)?;
    let result = simulate_resolved(&resolved, &params)?;
    tracing::info!(
        historical = resolved.historical,
        legs = result.legs.len(),
        wheel_return_pct = result.wheel_return_pct,
        "simulation finished"
    );
    Ok(SimulationReport {
        source: SeriesSource::from(&resolved),
        parameters: params,
        result,
    })
}

/// Backtest on historical bars when available. A failed acquisition does not
/// fail the use case; the report's `source.historical` is false instead.
pub fn run_backtest(config: &Config, env: UseCaseEnv<'_>) -> Result<BacktestReport, String> {
    let span = tracing::info_span!("app.backtest", symbol = %config.symbol());
    let _enter = span.enter();
    let start = Instant::now();

    let result = backtest_use_case(config, env);
    record_use_case_metrics("backtest", start, &result);
    result
}

fn backtest_use_case(config: &Config, env: UseCaseEnv<'_>) -> Result<BacktestReport, String> {
    let mut rng = seeded_rng(config.run.seed);
    let (resolved, params) = prepare(config, env, &mut rng)?;
    let report = backtest(&resolved.series, &params)
        .map_err(|err| format!("invalid strategy parameters: {err}"))?;
    Ok(BacktestReport {
        source: SeriesSource::from(&resolved),
        parameters: params,
        backtest: report,
    })
}

pub fn run_predict(config: &Config, env: UseCaseEnv<'_>) -> Result<PredictionReport, String> {
    let span = tracing::info_span!("app.predict", symbol = %config.symbol());
    let _enter = span.enter();
    let start = Instant::now();

    let result = predict_use_case(config, env);
    record_use_case_metrics("predict", start, &result);
    result
}

fn predict_use_case(config: &Config, env: UseCaseEnv<'_>) -> Result<PredictionReport, String> {
    let mut rng = seeded_rng(config.run.seed);
    let (resolved, params) = prepare(config, env, &mut rng)?;
    let prediction = predict(&resolved.series, &params, config.prediction_paths(), &mut rng);
    Ok(PredictionReport {
        source: SeriesSource::from(&resolved),
        parameters: params,
        prediction,
    })
}

pub fn run_risk(config: &Config, env: UseCaseEnv<'_>) -> Result<RiskRun, String> {
    let span = tracing::info_span!("app.risk", symbol = %config.symbol());
    let _enter = span.enter();
    let start = Instant::now();

    let result = risk_use_case(config, env);
    record_use_case_metrics("risk", start, &result);
    result
}

fn risk_use_case(config: &Config, env: UseCaseEnv<'_>) -> Result<RiskRun, String> {
    let mut rng = seeded_rng(config.run.seed);
    let (resolved, params) = prepare(config, env, &mut rng)?;
    let simulation = simulate_resolved(&resolved, &params)?;
    let risk = risk_report(&simulation, params.risk_free_rate, config.risk_confidence());
    tracing::info!(
        score = risk.composite_risk_score,
        label = %risk.risk_label,
        "risk report computed"
    );
    Ok(RiskRun {
        source: SeriesSource::from(&resolved),
        parameters: params,
        wheel_return_pct: simulation.wheel_return_pct,
        buy_hold_return_pct: simulation.buy_hold_return_pct,
        contracts_sold: simulation.contracts_sold(),
        risk,
    })
}

/// Greeks and expiry P&L of the put and covered call the wheel would sell at
/// the last close.
pub fn run_greeks(config: &Config, env: UseCaseEnv<'_>) -> Result<GreeksReport, String> {
    let span = tracing::info_span!("app.greeks", symbol = %config.symbol());
    let _enter = span.enter();
    let start = Instant::now();

    let result = greeks_use_case(config, env);
    record_use_case_metrics("greeks", start, &result);
    result
}

fn greeks_use_case(config: &Config, env: UseCaseEnv<'_>) -> Result<GreeksReport, String> {
    let mut rng = seeded_rng(config.run.seed);
    let (resolved, params) = prepare(config, env, &mut rng)?;
    let spot = resolved.series.last().close;
    let volatility = resolved.series.volatility();
    let greeks = wheel_greeks(spot, volatility, &params);

    let profile = |side: OptionSide, strike: f64| {
        let premium = option_price(
            spot,
            strike,
            params.time_to_expiry_years(),
            params.risk_free_rate,
            volatility,
            side,
        ) * SHARES_PER_CONTRACT as f64;
        pnl_scenarios(spot, strike, premium, side, params.contracts)
    };

    Ok(GreeksReport {
        source: SeriesSource::from(&resolved),
        parameters: params,
        put_pnl: profile(OptionSide::Put, greeks.put.strike),
        call_pnl: profile(OptionSide::Call, greeks.call.strike),
        greeks,
    })
}

/// Screens a chain snapshot. The model price uses the quote's implied
/// volatility, or 30% when the quote has none.
pub fn run_chain_screen(config: &Config, snapshot: &ChainSnapshot) -> Result<ChainScreen, String> {
    let span = tracing::info_span!("app.chain", symbol = %snapshot.symbol);
    let _enter = span.enter();
    let start = Instant::now();

    let result = chain_use_case(config, snapshot);
    record_use_case_metrics("chain", start, &result);
    result
}

fn chain_use_case(config: &Config, snapshot: &ChainSnapshot) -> Result<ChainScreen, String> {
    if !(snapshot.underlying_price.is_finite() && snapshot.underlying_price > 0.0) {
        return Err(format!(
            "chain snapshot for {} has invalid underlying price {}",
            snapshot.symbol, snapshot.underlying_price
        ));
    }
    let rate = config.strategy_parameters().risk_free_rate;
    let candidates = screen_wheel_candidates(snapshot, rate, FALLBACK_VOLATILITY);
    tracing::debug!(quotes = snapshot.contracts.len(), candidates = candidates.len(), "chain screened");
    Ok(ChainScreen {
        symbol: snapshot.symbol.clone(),
        underlying_price: snapshot.underlying_price,
        as_of: snapshot.as_of,
        quotes: snapshot.contracts.len(),
        candidates,
    })
}

/// Simulates a playbook preset on its own symbol, keeping the seed, data
/// source and risk-free rate from `config`.
pub fn run_preset(config: &Config, id: &str, env: UseCaseEnv<'_>) -> Result<PresetRun, String> {
    let strategy = preset(id).ok_or_else(|| format!("unknown preset strategy: {id}"))?;
    let rate = config.strategy_parameters().risk_free_rate;
    let params = strategy.parameters(rate);

    let mut preset_config = config.clone();
    preset_config.run.symbol = strategy.symbol.to_string();
    preset_config.strategy = Some(crate::config::StrategyConfig {
        initial_cash: Some(params.initial_cash),
        otm_pct: Some(params.otm_pct),
        days_to_expiry: Some(params.days_to_expiry),
        risk_free_rate: Some(params.risk_free_rate),
        contracts: Some(params.contracts),
    });

    let simulation = run_simulate(&preset_config, env)?;
    let risk = risk_report(&simulation.result, rate, preset_config.risk_confidence());
    Ok(PresetRun {
        strategy,
        simulation,
        risk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> UseCaseEnv<'static> {
        UseCaseEnv {
            market_data: None,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 30).expect("date"),
        }
    }

    fn seeded(symbol: &str) -> Config {
        let mut config = Config::for_symbol(symbol);
        config.run.seed = Some(11);
        config
    }

    #[test]
    fn seeded_simulation_is_reproducible() {
        let config = seeded("aapl");
        let a = run_simulate(&config, env()).expect("simulate");
        let b = run_simulate(&config, env()).expect("simulate");
        assert_eq!(a, b);
        assert_eq!(a.source.symbol, "AAPL");
        assert!(!a.source.historical);
        assert_eq!(a.source.last_date, env().as_of);
    }

    #[test]
    fn invalid_parameters_are_reported_before_running() {
        let mut config = seeded("SPY");
        config.strategy = Some(crate::config::StrategyConfig {
            contracts: Some(0),
            ..Default::default()
        });
        let err = run_simulate(&config, env()).expect_err("contracts = 0");
        assert!(err.contains("contracts"), "{err}");
    }

    #[test]
    fn greeks_report_prices_both_legs() {
        let report = run_greeks(&seeded("MSFT"), env()).expect("greeks");
        assert!(report.greeks.put.greeks.delta < 0.0);
        assert!(report.greeks.call.greeks.delta > 0.0);
        assert!(report.put_pnl.premium > 0.0);
        assert_eq!(report.put_pnl.points.len(), 51);
        assert!(report.put_pnl.breakeven < report.put_pnl.strike);
        assert!(report.call_pnl.breakeven > report.call_pnl.strike);
    }

    #[test]
    fn prediction_uses_configured_path_count() {
        let mut config = seeded("NVDA");
        config.prediction = Some(crate::config::PredictionConfig { paths: Some(300) });
        let report = run_predict(&config, env()).expect("predict");
        assert_eq!(report.prediction.paths, 300);
        assert_eq!(report.prediction.scenarios.len(), 300);
        assert_eq!(
            report.prediction.distribution.iter().map(|b| b.count).sum::<usize>(),
            300
        );
    }

    #[test]
    fn chain_screen_rejects_bad_underlying() {
        let snapshot = ChainSnapshot {
            symbol: "SPY".to_string(),
            underlying_price: 0.0,
            as_of: env().as_of,
            contracts: Vec::new(),
        };
        assert!(run_chain_screen(&Config::default(), &snapshot).is_err());
    }

    #[test]
    fn preset_runs_on_its_own_symbol() {
        let run = run_preset(&seeded("SPY"), "theta-harvest", env()).expect("preset");
        assert_eq!(run.simulation.source.symbol, "MSFT");
        assert_eq!(run.simulation.parameters.contracts, 2);
        assert!(run.risk.composite_risk_score <= 100);
        assert!(run_preset(&Config::default(), "nope", env()).is_err());
    }
}
