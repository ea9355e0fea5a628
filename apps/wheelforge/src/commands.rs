use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use wheelforge_application::config::{self, Config};
use wheelforge_application::optimizer::{compare_instruments, optimize};
use wheelforge_application::simulation::{
    run_backtest, run_chain_screen, run_greeks, run_predict, run_preset, run_risk, run_simulate,
    UseCaseEnv,
};
use wheelforge_domain::repositories::market_data::MarketDataRepository;
use wheelforge_domain::services::playbook::{
    recommend, Capital, Experience, Goal, InvestorProfile, RiskTolerance, TradeFrequency,
};
use wheelforge_infrastructure::chain::load_chain_snapshot;
use wheelforge_infrastructure::market_data::CsvMarketDataRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Validate,
    Simulate,
    Backtest,
    Predict,
    Greeks,
    Risk,
    Optimize,
    Compare,
    Chain,
    Playbook,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileArgs {
    pub experience: Option<Experience>,
    pub goal: Option<Goal>,
    pub capital: Option<Capital>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub frequency: Option<TradeFrequency>,
}

impl ProfileArgs {
    /// All five answers, or none for an unranked catalogue.
    pub fn into_profile(self) -> Result<Option<InvestorProfile>, String> {
        match (
            self.experience,
            self.goal,
            self.capital,
            self.risk_tolerance,
            self.frequency,
        ) {
            (None, None, None, None, None) => Ok(None),
            (Some(experience), Some(goal), Some(capital), Some(risk_tolerance), Some(frequency)) => {
                Ok(Some(InvestorProfile {
                    experience,
                    goal,
                    capital,
                    risk_tolerance,
                    frequency,
                }))
            }
            _ => Err(
                "an investor profile needs --experience, --goal, --capital, --risk-tolerance and --frequency"
                    .to_string(),
            ),
        }
    }
}

pub struct CommandArgs {
    pub command: CommandKind,
    pub config_path: Option<PathBuf>,
    pub symbol: Option<String>,
    pub seed: Option<u64>,
    pub chain_snapshot: Option<PathBuf>,
    pub preset: Option<String>,
    pub profile: ProfileArgs,
}

/// Runs one command and returns its JSON document.
pub fn run_command(args: CommandArgs) -> Result<serde_json::Value, String> {
    let config = resolve_config(args.config_path.as_deref(), args.symbol.as_deref(), args.seed)?;
    let repo = build_market_data_repo(&config);
    let env = UseCaseEnv::new(repo.as_ref().map(|r| r as &dyn MarketDataRepository));

    match args.command {
        CommandKind::Validate => run_validate(&config),
        CommandKind::Simulate => to_json(&run_simulate(&config, env)?),
        CommandKind::Backtest => to_json(&run_backtest(&config, env)?),
        CommandKind::Predict => to_json(&run_predict(&config, env)?),
        CommandKind::Greeks => to_json(&run_greeks(&config, env)?),
        CommandKind::Risk => to_json(&run_risk(&config, env)?),
        CommandKind::Optimize => to_json(&optimize(&config, env.as_of)?),
        CommandKind::Compare => to_json(&compare_instruments(&config, env.as_of)?),
        CommandKind::Chain => {
            let path = args
                .chain_snapshot
                .as_deref()
                .ok_or_else(|| "--snapshot is required for chain".to_string())?;
            let snapshot = load_chain_snapshot(path)?;
            to_json(&run_chain_screen(&config, &snapshot)?)
        }
        CommandKind::Playbook => match args.preset.as_deref() {
            Some(id) => to_json(&run_preset(&config, id, env)?),
            None => {
                let profile = args.profile.into_profile()?;
                to_json(&recommend(profile.as_ref()))
            }
        },
    }
}

/// `--config`, then `WHEELFORGE_CONFIG`, then defaults; `--symbol` and
/// `--seed` override whatever was loaded.
pub fn resolve_config(
    path: Option<&std::path::Path>,
    symbol: Option<&str>,
    seed: Option<u64>,
) -> Result<Config, String> {
    let env_path = std::env::var("WHEELFORGE_CONFIG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let mut config = match path.map(PathBuf::from).or(env_path) {
        Some(path) => config::load_config(&path)?,
        None => Config::default(),
    };
    if let Some(symbol) = symbol {
        config.run.symbol = symbol.to_string();
    }
    if seed.is_some() {
        config.run.seed = seed;
    }
    Ok(config)
}

fn build_market_data_repo(config: &Config) -> Option<CsvMarketDataRepository> {
    config.bars_dir().map(CsvMarketDataRepository::new)
}

fn run_validate(config: &Config) -> Result<serde_json::Value, String> {
    config.validate()?;
    Ok(serde_json::json!({
        "status": "ok",
        "symbol": config.symbol(),
        "config_toml": config::to_toml_pretty(config)?,
    }))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|err| format!("failed to serialize output: {err}"))
}

/// Parses a snake_case choice through the type's serde names.
pub fn parse_choice<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
        .map_err(|_| format!("invalid value: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: CommandKind) -> CommandArgs {
        CommandArgs {
            command,
            config_path: None,
            symbol: Some("aapl".to_string()),
            seed: Some(4),
            chain_snapshot: None,
            preset: None,
            profile: ProfileArgs::default(),
        }
    }

    #[test]
    fn parse_choice_uses_serde_names() {
        assert_eq!(parse_choice::<Capital>("10k_to_50k"), Ok(Capital::From10kTo50k));
        assert_eq!(
            parse_choice::<RiskTolerance>("Very_Aggressive"),
            Ok(RiskTolerance::VeryAggressive)
        );
        assert!(parse_choice::<Goal>("fame").is_err());
    }

    #[test]
    fn partial_profiles_are_rejected() {
        let partial = ProfileArgs {
            goal: Some(Goal::Income),
            ..ProfileArgs::default()
        };
        assert!(partial.into_profile().is_err());
        assert_eq!(ProfileArgs::default().into_profile(), Ok(None));
    }

    #[test]
    fn simulate_command_prints_a_seeded_report() {
        let a = run_command(args(CommandKind::Simulate)).expect("simulate");
        assert_eq!(a["source"]["symbol"], "AAPL");
        assert_eq!(a["source"]["historical"], false);
        assert!(a["result"]["equity_history"].is_array());
    }

    #[test]
    fn validate_and_playbook_commands() {
        let validated = run_command(args(CommandKind::Validate)).expect("validate");
        assert_eq!(validated["status"], "ok");

        let mut playbook = args(CommandKind::Playbook);
        playbook.profile = ProfileArgs {
            experience: Some(Experience::Beginner),
            goal: Some(Goal::Income),
            capital: Some(Capital::Under10k),
            risk_tolerance: Some(RiskTolerance::Conservative),
            frequency: Some(TradeFrequency::Monthly),
        };
        let ranked = run_command(playbook).expect("playbook");
        assert_eq!(ranked[0]["strategy"]["id"], "conservative-income");
        assert_eq!(ranked[0]["fit_score"], 90);
    }

    #[test]
    fn chain_command_requires_a_snapshot() {
        let err = run_command(args(CommandKind::Chain)).expect_err("missing snapshot");
        assert!(err.contains("--snapshot"));
    }
}
