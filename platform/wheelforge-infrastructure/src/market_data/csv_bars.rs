use super::filter_range;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use wheelforge_domain::errors::MarketDataError;
use wheelforge_domain::repositories::market_data::{DailyBarsQuery, MarketDataRepository};
use wheelforge_domain::value_objects::price_bar::PriceBar;

/// One row of a daily-bar CSV. Only `date` and `close` are required; the
/// capitalized headers of common vendor exports are accepted as aliases.
#[derive(Debug, Deserialize)]
pub struct DailyBarRecord {
    #[serde(alias = "Date", alias = "timestamp", alias = "timestamp_utc")]
    pub date: String,
    #[serde(alias = "Close")]
    pub close: f64,
    #[serde(default, alias = "Open")]
    pub open: Option<f64>,
    #[serde(default, alias = "High")]
    pub high: Option<f64>,
    #[serde(default, alias = "Low")]
    pub low: Option<f64>,
    #[serde(default, alias = "Volume")]
    pub volume: Option<f64>,
}

/// Reads `<dir>/<SYMBOL>.csv` per symbol.
#[derive(Debug, Clone)]
pub struct CsvMarketDataRepository {
    dir: PathBuf,
}

impl CsvMarketDataRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.trim().to_uppercase()))
    }
}

impl MarketDataRepository for CsvMarketDataRepository {
    fn load_daily_bars(&self, query: &DailyBarsQuery) -> Result<Vec<PriceBar>, MarketDataError> {
        let path = self.path_for(&query.symbol);
        let span = tracing::debug_span!("infra.bars.load_csv", path = %path.display());
        let _enter = span.enter();
        let start = Instant::now();

        let result = match File::open(&path) {
            Ok(file) => read_bars(file).map(|bars| filter_range(bars, query)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(MarketDataError::NotFound(query.symbol.clone()))
            }
            Err(err) => Err(MarketDataError::Unavailable(format!(
                "failed to open {}: {err}",
                path.display()
            ))),
        };

        record_load_metrics(start, &result);
        if let Ok(bars) = &result {
            tracing::debug!(bars = bars.len(), "loaded daily bars");
        }
        result
    }
}

/// Parses a daily-bar CSV file. Rows keep file order; cleaning is left to
/// the caller.
pub fn load_daily_csv(path: &Path) -> Result<Vec<PriceBar>, MarketDataError> {
    let file = File::open(path).map_err(|err| {
        MarketDataError::Unavailable(format!("failed to open {}: {err}", path.display()))
    })?;
    read_bars(file)
}

fn read_bars<R: std::io::Read>(source: R) -> Result<Vec<PriceBar>, MarketDataError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    let mut bars = Vec::new();
    for (row, result) in reader.deserialize::<DailyBarRecord>().enumerate() {
        let record = result.map_err(|err| {
            MarketDataError::Malformed(format!("failed to parse CSV row {}: {err}", row + 1))
        })?;
        bars.push(PriceBar {
            date: parse_date(&record.date)?,
            close: record.close,
            open: record.open,
            high: record.high,
            low: record.low,
            volume: record.volume,
        });
    }
    Ok(bars)
}

fn parse_date(value: &str) -> Result<NaiveDate, MarketDataError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%m/%d/%Y") {
        return Ok(date);
    }
    Err(MarketDataError::Malformed(format!(
        "unsupported date format: {value}"
    )))
}

fn record_load_metrics<T>(start: Instant, result: &Result<T, MarketDataError>) {
    let result_label = match result {
        Ok(_) => "ok",
        Err(MarketDataError::NotFound(_)) => "not_found",
        Err(_) => "err",
    };
    metrics::counter!("wheelforge.infra.bars.loads_total", "result" => result_label).increment(1);
    metrics::histogram!("wheelforge.infra.bars.load_ms", "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}
