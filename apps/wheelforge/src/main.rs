use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use wheelforge::commands::{parse_choice, run_command, CommandArgs, CommandKind, ProfileArgs};
use wheelforge_domain::services::playbook::{
    Capital, Experience, Goal, RiskTolerance, TradeFrequency,
};

#[derive(Parser, Debug)]
#[command(name = "wheelforge")]
#[command(about = "Wheel options strategy simulator, optimizer and risk analyzer.", version)]
struct Cli {
    /// Config file path (TOML). If omitted, uses env WHEELFORGE_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ticker to run; overrides `[run].symbol`.
    #[arg(long, global = true)]
    symbol: Option<String>,

    /// RNG seed; overrides `[run].seed`.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Prometheus metrics listen addr (e.g. 127.0.0.1:9898). Optional.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the config and print it back normalized.
    Validate,
    /// One wheel simulation over the resolved series.
    Simulate,
    /// Simulation plus trade-level backtest statistics.
    Backtest,
    /// Price trend, assignment probabilities, premium estimates and a Monte Carlo price distribution.
    Predict,
    /// Greeks of the next put and call, with expiry P&L scenarios.
    Greeks,
    /// Risk analytics over one simulation.
    Risk,
    /// Grid search over OTM distance and days to expiry.
    Optimize,
    /// The configured strategy across the instrument list.
    Compare,
    /// Screen an option chain snapshot (JSON) for put candidates.
    Chain {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Rank preset strategies for a profile, or run one preset.
    Playbook(PlaybookArgs),
}

#[derive(Args, Debug)]
struct PlaybookArgs {
    /// Run this preset instead of ranking.
    #[arg(long)]
    preset: Option<String>,

    /// beginner | basics | intermediate | advanced
    #[arg(long, value_parser = parse_choice::<Experience>)]
    experience: Option<Experience>,

    /// income | growth | learning | supplement
    #[arg(long, value_parser = parse_choice::<Goal>)]
    goal: Option<Goal>,

    /// under_10k | 10k_to_50k | 50k_to_100k | over_100k
    #[arg(long, value_parser = parse_choice::<Capital>)]
    capital: Option<Capital>,

    /// conservative | moderate | aggressive | very_aggressive
    #[arg(long, value_parser = parse_choice::<RiskTolerance>)]
    risk_tolerance: Option<RiskTolerance>,

    /// weekly | bi_weekly | monthly | flexible
    #[arg(long, value_parser = parse_choice::<TradeFrequency>)]
    frequency: Option<TradeFrequency>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let args = command_args(cli);
    let label = command_label(args.command);
    metrics::counter!("wheelforge.cli.commands_total", "command" => label).increment(1);

    match run_command(args) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: failed to render output: {err}");
                std::process::exit(1);
            }
        },
        Err(err) => {
            tracing::error!(command = label, error = %err, "command failed");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn command_args(cli: Cli) -> CommandArgs {
    let mut chain_snapshot = None;
    let mut preset = None;
    let mut profile = ProfileArgs::default();
    let command = match cli.command {
        Command::Validate => CommandKind::Validate,
        Command::Simulate => CommandKind::Simulate,
        Command::Backtest => CommandKind::Backtest,
        Command::Predict => CommandKind::Predict,
        Command::Greeks => CommandKind::Greeks,
        Command::Risk => CommandKind::Risk,
        Command::Optimize => CommandKind::Optimize,
        Command::Compare => CommandKind::Compare,
        Command::Chain { snapshot } => {
            chain_snapshot = Some(snapshot);
            CommandKind::Chain
        }
        Command::Playbook(args) => {
            preset = args.preset;
            profile = ProfileArgs {
                experience: args.experience,
                goal: args.goal,
                capital: args.capital,
                risk_tolerance: args.risk_tolerance,
                frequency: args.frequency,
            };
            CommandKind::Playbook
        }
    };
    CommandArgs {
        command,
        config_path: cli.config,
        symbol: cli.symbol,
        seed: cli.seed,
        chain_snapshot,
        preset,
        profile,
    }
}

fn command_label(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::Validate => "validate",
        CommandKind::Simulate => "simulate",
        CommandKind::Backtest => "backtest",
        CommandKind::Predict => "predict",
        CommandKind::Greeks => "greeks",
        CommandKind::Risk => "risk",
        CommandKind::Optimize => "optimize",
        CommandKind::Compare => "compare",
        CommandKind::Chain => "chain",
        CommandKind::Playbook => "playbook",
    }
}

// Logs go to stderr so stdout stays a single JSON document.
fn init_tracing(format: LogFormat) -> Result<(), String> {
    let filter = std::env::var("WHEELFORGE_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics(metrics_addr: Option<&str>) -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = metrics_addr else {
        return Ok(None);
    };
    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| format!("invalid --metrics-addr (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics(metrics_addr: Option<&str>) -> Result<Option<SocketAddr>, String> {
    if metrics_addr.is_some() {
        return Err("metrics exporter requires wheelforge feature `prometheus`".to_string());
    }
    Ok(None)
}
