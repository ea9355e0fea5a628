use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use wheelforge_application::config::{load_config, Config};
use wheelforge_application::optimizer::{compare_instruments, optimize};
use wheelforge_application::simulation::{
    run_backtest, run_chain_screen, run_risk, run_simulate, UseCaseEnv,
};
use wheelforge_domain::services::chain::{ChainSnapshot, OptionQuote};
use wheelforge_domain::value_objects::option_side::OptionSide;
use wheelforge_domain::value_objects::price_bar::PriceBar;
use wheelforge_infrastructure::market_data::{CsvMarketDataRepository, InMemoryMarketDataRepository};

fn unique_tmp_dir(prefix: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("wheelforge_{prefix}_{}_{}", std::process::id(), now))
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("date")
}

fn weekday_bars(count: usize) -> Vec<PriceBar> {
    let mut bars = Vec::with_capacity(count);
    let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).expect("date");
    while bars.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let i = bars.len() as f64;
            bars.push(PriceBar::close_only(date, 120.0 + 0.05 * i + 4.0 * (i / 9.0).sin()));
        }
        date += Duration::days(1);
    }
    bars
}

#[test]
fn backtest_uses_csv_history_when_present() {
    let dir = unique_tmp_dir("app_backtest");
    std::fs::create_dir_all(&dir).expect("dir");
    let mut csv = String::from("date,close\n");
    for bar in weekday_bars(300) {
        csv.push_str(&format!("{},{:.2}\n", bar.date, bar.close));
    }
    std::fs::write(dir.join("AMD.csv"), csv).expect("write csv");

    let config_path = dir.join("wheel.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[run]
symbol = "AMD"
seed = 3

[strategy]
days_to_expiry = 10
otm_pct = 0.04

[data]
bars_dir = "{}"
volatility_window = 60
"#,
            dir.display()
        ),
    )
    .expect("write config");

    let config = load_config(&config_path).expect("load config");
    let bars_dir = config.bars_dir().expect("bars dir").to_string();
    let repo = CsvMarketDataRepository::new(bars_dir);
    let env = UseCaseEnv {
        market_data: Some(&repo),
        as_of: as_of(),
    };

    let report = run_backtest(&config, env).expect("backtest");
    assert!(report.source.historical);
    assert_eq!(report.source.bars, 300);
    assert!(report.backtest.years_spanned > 1.0);
    assert!(report.backtest.result.contracts_sold() > 20);
    assert!((0.0..=1.0).contains(&report.backtest.win_rate));

    let mut other = config.clone();
    other.run.symbol = "META".to_string();
    let fallback = run_backtest(&other, env).expect("fallback backtest");
    assert!(!fallback.source.historical);
    assert_eq!(fallback.source.last_date, as_of());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn risk_report_over_in_memory_history() {
    let repo = InMemoryMarketDataRepository::new().with_symbol("NVDA", weekday_bars(250));
    let mut config = Config::for_symbol("nvda");
    config.run.seed = Some(8);
    let env = UseCaseEnv {
        market_data: Some(&repo),
        as_of: as_of(),
    };

    let run = run_risk(&config, env).expect("risk");
    assert!(run.source.historical);
    assert!(run.risk.composite_risk_score <= 100);
    assert!(run.risk.value_at_risk >= 0.0);
    assert!(run.risk.conditional_value_at_risk >= run.risk.value_at_risk - 1e-12);

    let simulation = run_simulate(&config, env).expect("simulate");
    assert_eq!(simulation.result.wheel_return_pct, run.wheel_return_pct);
}

#[test]
fn optimizer_and_comparator_honour_config() {
    let config: Config = toml::from_str(
        r#"
[run]
symbol = "SPY"
seed = 17

[optimizer]
otm_pcts = [0.02, 0.05, 0.08]
days_to_expiry = [5, 30]
runs_per_cell = 2
parallelism = 2
instruments = ["SPY", "AAPL", "TSLA"]
"#,
    )
    .expect("config");

    let report = optimize(&config, as_of()).expect("optimize");
    assert_eq!(report.cells.len(), 6);
    assert_eq!(report.seed, Some(17));
    assert_eq!(report.runs_per_cell, 2);
    assert!(report
        .cells
        .windows(2)
        .all(|w| w[0].wheel_return >= w[1].wheel_return));

    let rows = compare_instruments(&config, as_of()).expect("compare");
    let mut symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
    symbols.sort_unstable();
    assert_eq!(symbols, vec!["AAPL", "SPY", "TSLA"]);

    let mut expired = config.clone();
    if let Some(optimizer) = expired.optimizer.as_mut() {
        optimizer.time_budget_ms = Some(0);
    }
    let err = optimize(&expired, as_of()).expect_err("budget");
    assert!(err.contains("time budget"), "{err}");
}

#[test]
fn chain_screen_ranks_put_candidates() {
    let as_of = as_of();
    let quote = |strike: f64, bid: f64, delta: f64| OptionQuote {
        side: OptionSide::Put,
        strike,
        expiration: as_of + Duration::days(21),
        bid,
        ask: Some(bid + 0.1),
        delta,
        implied_volatility: None,
        volume: Some(100),
        open_interest: Some(1_000),
    };
    let snapshot = ChainSnapshot {
        symbol: "SPY".to_string(),
        underlying_price: 585.0,
        as_of,
        contracts: vec![
            quote(560.0, 3.2, -0.22),
            quote(570.0, 5.0, -0.31),
            quote(590.0, 9.0, -0.52),
        ],
    };

    let screen = run_chain_screen(&Config::default(), &snapshot).expect("screen");
    assert_eq!(screen.quotes, 3);
    assert_eq!(screen.candidates.len(), 2);
    assert!((screen.candidates[0].quote.strike - 570.0).abs() < 1e-12);
    assert!(screen.candidates.iter().all(|c| c.model_price > 0.0));
}
