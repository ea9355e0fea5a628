use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wheelforge_domain::entities::price_series::PriceSeries;
use wheelforge_domain::services::price_series::{generate_synthetic, historical_volatility};
use wheelforge_domain::services::pricing::{normal_cdf, option_price};
use wheelforge_domain::services::risk::{risk_report, DEFAULT_CONFIDENCE};
use wheelforge_domain::services::wheel::simulate;
use wheelforge_domain::value_objects::instrument::InstrumentProfile;
use wheelforge_domain::value_objects::option_side::OptionSide;
use wheelforge_domain::value_objects::price_bar::PriceBar;
use wheelforge_domain::value_objects::strategy_params::StrategyParameters;

fn series_from(closes: &[f64], volatility: f64) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 6, 1).expect("date");
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, close)| PriceBar::close_only(start + Duration::days(i as i64), *close))
        .collect();
    PriceSeries::new(bars, volatility, 0.05).expect("series")
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn put_call_parity(
        spot in 1.0f64..1_000.0,
        moneyness in 0.5f64..1.5,
        t in 0.01f64..3.0,
        rate in -0.02f64..0.15,
        sigma in 0.01f64..1.5,
    ) {
        let strike = spot * moneyness;
        let call = option_price(spot, strike, t, rate, sigma, OptionSide::Call);
        let put = option_price(spot, strike, t, rate, sigma, OptionSide::Put);
        let parity = put + spot - strike * (-rate * t).exp();
        // Deep out-of-the-money legs may be floored at 0, which shifts parity by
        // at most the approximation error times the notional.
        prop_assert!((call - parity).abs() <= 1e-6 * (spot + strike), "call={call} parity={parity}");
    }

    #[test]
    fn normal_cdf_is_a_probability(x in -40.0f64..40.0) {
        let p = normal_cdf(x);
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert!((p + normal_cdf(-x) - 1.0).abs() < 1e-8);
    }

    #[test]
    fn shares_are_zero_or_a_full_lot(
        seed in any::<u64>(),
        otm_pct in 0.01f64..0.15,
        days_to_expiry in 1u32..40,
        contracts in 1u32..4,
    ) {
        let profile = InstrumentProfile::lookup("TSLA");
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).expect("date");
        let series = generate_synthetic(&profile, 252, end, &mut StdRng::seed_from_u64(seed))
            .expect("series");
        let params = StrategyParameters {
            initial_cash: 500_000.0,
            otm_pct,
            days_to_expiry,
            risk_free_rate: 0.04,
            contracts,
        };
        let result = simulate(&series, &params).expect("sim");
        let lot = 100 * u64::from(contracts);

        prop_assert!(result.equity_history.iter().all(|p| p.shares_held == 0 || p.shares_held == lot));
        prop_assert!(result.final_shares == 0 || result.final_shares == lot);
        prop_assert!(result.puts_assigned <= result.puts_sold);
        prop_assert!(result.calls_assigned <= result.calls_sold);
        prop_assert!(result.calls_assigned <= result.puts_assigned);
        prop_assert_eq!(result.legs.len() as u32, result.contracts_sold());
        prop_assert_eq!(result.equity_history.len(), result.legs.len());
        prop_assert!(result.equity_history.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn risk_report_is_bounded(
        closes in prop::collection::vec(20.0f64..200.0, 2..300),
        days_to_expiry in 1u32..15,
    ) {
        let series = series_from(&closes, 0.4);
        let params = StrategyParameters {
            initial_cash: 100_000.0,
            days_to_expiry,
            ..StrategyParameters::default()
        };
        let result = simulate(&series, &params).expect("sim");
        let report = risk_report(&result, 0.05, DEFAULT_CONFIDENCE);

        prop_assert!(report.composite_risk_score <= 100);
        prop_assert!(report.value_at_risk >= 0.0);
        prop_assert!(report.conditional_value_at_risk >= report.value_at_risk - 1e-12);
        prop_assert!((0.0..=1.0).contains(&report.win_rate));
        prop_assert!(report.kelly_fraction >= 0.0);
        prop_assert!((0.0..=100.0).contains(&report.recovery_rate_pct));
        prop_assert!(report.max_drawdown_pct >= 0.0);
    }

    #[test]
    fn constant_series_has_no_volatility(close in 1.0f64..1_000.0, n in 3usize..100) {
        let series = series_from(&vec![close; n], 0.0);
        prop_assert_eq!(historical_volatility(series.bars(), None), 0.0);
    }
}
