use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use wheelforge_domain::repositories::market_data::{DailyBarsQuery, MarketDataRepository};
use wheelforge_domain::services::bars::canonicalize;
use wheelforge_domain::services::price_series::fit_historical;
use wheelforge_infrastructure::market_data::CsvMarketDataRepository;

fn unique_tmp_dir(prefix: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("wheelforge_{prefix}_{}_{}", std::process::id(), now))
}

#[test]
fn csv_history_fits_a_price_series() {
    let dir = unique_tmp_dir("csv_history");
    std::fs::create_dir_all(&dir).expect("dir");

    let mut csv = String::from("date,open,high,low,close,volume\n");
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 2).expect("date");
    let mut written = 0;
    while written < 260 {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let close = 200.0 + written as f64 * 0.2 + if written % 2 == 0 { 1.5 } else { -1.5 };
            writeln!(csv, "{date},{close},{close},{close},{close},1000").expect("format");
            written += 1;
        }
        date += Duration::days(1);
    }
    // a late correction for the first day and a bad close
    csv.push_str("2024-01-02,201,201,201,201,1\n2024-01-03,0,0,0,0,0\n");
    std::fs::write(dir.join("TSLA.csv"), csv).expect("write csv");

    let repo = CsvMarketDataRepository::new(&dir);
    let raw = repo.load_daily_bars(&DailyBarsQuery::all("tsla")).expect("load");
    assert_eq!(raw.len(), 262);

    let (bars, report) = canonicalize(raw);
    assert_eq!(bars.len(), 260);
    assert_eq!(report.invalid_close, 1);
    assert_eq!(report.out_of_order, 1);
    assert!((bars[0].close - 201.0).abs() < 1e-12);

    let series = fit_historical(bars, Some(60)).expect("series");
    assert!(series.volatility() > 0.05);
    assert!(series.drift() > 0.0);
    let _ = std::fs::remove_dir_all(&dir);
}
