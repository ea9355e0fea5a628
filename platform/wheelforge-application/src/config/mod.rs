use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use wheelforge_domain::services::prediction::DEFAULT_PATHS;
use wheelforge_domain::services::risk::DEFAULT_CONFIDENCE;
use wheelforge_domain::value_objects::strategy_params::StrategyParameters;

pub const DEFAULT_HISTORY_DAYS: u32 = 365;
pub const DEFAULT_OPTIMIZER_DAYS: u32 = 252;
pub const DEFAULT_RUNS_PER_CELL: usize = 3;
pub const DEFAULT_OTM_PCTS: [f64; 8] = [0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.10];
pub const DEFAULT_DAYS_TO_EXPIRY: [u32; 8] = [3, 5, 7, 10, 14, 21, 30, 45];

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub strategy: Option<StrategyConfig>,
    pub data: Option<DataConfig>,
    pub optimizer: Option<OptimizerConfig>,
    pub prediction: Option<PredictionConfig>,
    pub risk: Option<RiskConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub symbol: String,
    /// Fixes every random draw; omitted means entropy.
    pub seed: Option<u64>,
    /// Calendar days of synthetic history for single-instrument use cases.
    pub history_days: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    pub initial_cash: Option<f64>,
    pub otm_pct: Option<f64>,
    pub days_to_expiry: Option<u32>,
    pub risk_free_rate: Option<f64>,
    pub contracts: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Directory of `<SYMBOL>.csv` daily bars; historical data is skipped when absent.
    pub bars_dir: Option<String>,
    pub volatility_window: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    pub otm_pcts: Option<Vec<f64>>,
    pub days_to_expiry: Option<Vec<u32>>,
    pub runs_per_cell: Option<usize>,
    pub parallelism: Option<usize>,
    pub time_budget_ms: Option<u64>,
    pub instruments: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PredictionConfig {
    pub paths: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RiskConfig {
    pub confidence: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_symbol("SPY")
    }
}

impl Config {
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            run: RunConfig {
                symbol: symbol.to_string(),
                seed: None,
                history_days: None,
            },
            strategy: None,
            data: None,
            optimizer: None,
            prediction: None,
            risk: None,
        }
    }

    pub fn symbol(&self) -> String {
        self.run.symbol.trim().to_uppercase()
    }

    pub fn history_days(&self) -> u32 {
        self.run.history_days.unwrap_or(DEFAULT_HISTORY_DAYS)
    }

    pub fn strategy_parameters(&self) -> StrategyParameters {
        let defaults = StrategyParameters::default();
        let strategy = self.strategy.clone().unwrap_or_default();
        StrategyParameters {
            initial_cash: strategy.initial_cash.unwrap_or(defaults.initial_cash),
            otm_pct: strategy.otm_pct.unwrap_or(defaults.otm_pct),
            days_to_expiry: strategy.days_to_expiry.unwrap_or(defaults.days_to_expiry),
            risk_free_rate: strategy.risk_free_rate.unwrap_or(defaults.risk_free_rate),
            contracts: strategy.contracts.unwrap_or(defaults.contracts),
        }
    }

    pub fn bars_dir(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.bars_dir.as_deref())
    }

    pub fn volatility_window(&self) -> Option<usize> {
        self.data.as_ref().and_then(|d| d.volatility_window)
    }

    pub fn otm_pcts(&self) -> Vec<f64> {
        self.optimizer
            .as_ref()
            .and_then(|o| o.otm_pcts.clone())
            .unwrap_or_else(|| DEFAULT_OTM_PCTS.to_vec())
    }

    pub fn optimizer_days_to_expiry(&self) -> Vec<u32> {
        self.optimizer
            .as_ref()
            .and_then(|o| o.days_to_expiry.clone())
            .unwrap_or_else(|| DEFAULT_DAYS_TO_EXPIRY.to_vec())
    }

    pub fn runs_per_cell(&self) -> usize {
        self.optimizer
            .as_ref()
            .and_then(|o| o.runs_per_cell)
            .unwrap_or(DEFAULT_RUNS_PER_CELL)
    }

    pub fn parallelism(&self) -> usize {
        self.optimizer
            .as_ref()
            .and_then(|o| o.parallelism)
            .unwrap_or(1)
            .max(1)
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.optimizer
            .as_ref()
            .and_then(|o| o.time_budget_ms)
            .map(Duration::from_millis)
    }

    /// Symbols for the multi-instrument comparison; the built-in catalogue by default.
    pub fn instruments(&self) -> Vec<String> {
        self.optimizer
            .as_ref()
            .and_then(|o| o.instruments.clone())
            .unwrap_or_else(|| {
                wheelforge_domain::value_objects::instrument::InstrumentProfile::builtin()
                    .into_iter()
                    .map(|profile| profile.symbol)
                    .collect()
            })
    }

    pub fn prediction_paths(&self) -> usize {
        self.prediction
            .as_ref()
            .and_then(|p| p.paths)
            .unwrap_or(DEFAULT_PATHS)
    }

    pub fn risk_confidence(&self) -> f64 {
        self.risk
            .as_ref()
            .and_then(|r| r.confidence)
            .unwrap_or(DEFAULT_CONFIDENCE)
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol().is_empty() {
            return Err("run.symbol must not be empty".to_string());
        }
        if self.history_days() < 2 {
            return Err("run.history_days must be at least 2".to_string());
        }
        self.strategy_parameters()
            .validate()
            .map_err(|err| format!("invalid [strategy]: {err}"))?;

        if self.volatility_window() == Some(0) || self.volatility_window() == Some(1) {
            return Err("data.volatility_window must be at least 2".to_string());
        }

        let otm_pcts = self.otm_pcts();
        if otm_pcts.is_empty() {
            return Err("optimizer.otm_pcts must not be empty".to_string());
        }
        if let Some(bad) = otm_pcts.iter().find(|v| !(**v > 0.0 && **v < 1.0)) {
            return Err(format!("optimizer.otm_pcts values must be in (0, 1), got {bad}"));
        }
        let dtes = self.optimizer_days_to_expiry();
        if dtes.is_empty() || dtes.contains(&0) {
            return Err("optimizer.days_to_expiry must be non-empty and >= 1".to_string());
        }
        if self.runs_per_cell() == 0 {
            return Err("optimizer.runs_per_cell must be at least 1".to_string());
        }
        if self.instruments().iter().any(|s| s.trim().is_empty()) {
            return Err("optimizer.instruments must not contain empty symbols".to_string());
        }
        if self.prediction_paths() == 0 {
            return Err("prediction.paths must be at least 1".to_string());
        }
        let confidence = self.risk_confidence();
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(format!("risk.confidence must be in (0, 1), got {confidence}"));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    Ok((config, contents))
}

pub fn to_toml_pretty(config: &Config) -> Result<String, String> {
    toml::to_string_pretty(config)
        .map_err(|err| format!("failed to serialize config as TOML: {err}"))
}
