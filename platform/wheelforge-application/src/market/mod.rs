//! Hybrid price-series resolution: historical bars first, synthetic GBM otherwise.

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use wheelforge_domain::entities::price_series::PriceSeries;
use wheelforge_domain::errors::MarketDataError;
use wheelforge_domain::repositories::market_data::{DailyBarsQuery, MarketDataRepository};
use wheelforge_domain::services::bars::{canonicalize, BarQualityReport};
use wheelforge_domain::services::price_series::{
    fit_historical, generate_synthetic, MIN_HISTORY_BARS,
};
use wheelforge_domain::value_objects::instrument::InstrumentProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSeries {
    pub symbol: String,
    /// True when the bars came from the repository, false for a synthetic walk.
    pub historical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<BarQualityReport>,
    #[serde(skip)]
    pub series: PriceSeries,
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesRequest<'a> {
    pub symbol: &'a str,
    pub history_days: u32,
    pub volatility_window: Option<usize>,
    pub end: NaiveDate,
}

/// Loads and fits historical bars, failing when fewer than
/// [`MIN_HISTORY_BARS`] clean bars remain.
pub fn load_historical(
    repo: &dyn MarketDataRepository,
    symbol: &str,
    volatility_window: Option<usize>,
) -> Result<(PriceSeries, BarQualityReport), MarketDataError> {
    let raw = repo.load_daily_bars(&DailyBarsQuery::all(symbol))?;
    let (bars, report) = canonicalize(raw);
    if bars.len() < MIN_HISTORY_BARS {
        return Err(MarketDataError::InsufficientHistory {
            symbol: symbol.to_string(),
            bars: bars.len(),
            required: MIN_HISTORY_BARS,
        });
    }
    let series = fit_historical(bars, volatility_window)
        .map_err(|err| MarketDataError::Malformed(err.to_string()))?;
    Ok((series, report))
}

pub fn synthetic_series<R: Rng + ?Sized>(
    symbol: &str,
    history_days: u32,
    end: NaiveDate,
    rng: &mut R,
) -> Result<PriceSeries, String> {
    let profile = InstrumentProfile::lookup(symbol);
    generate_synthetic(&profile, history_days, end, rng)
        .map_err(|err| format!("failed to generate synthetic series for {symbol}: {err}"))
}

/// Never fails on data acquisition: any repository error, or a missing
/// repository, yields a synthetic series with `historical == false`.
pub fn resolve_series<R: Rng + ?Sized>(
    repo: Option<&dyn MarketDataRepository>,
    request: SeriesRequest<'_>,
    rng: &mut R,
) -> Result<ResolvedSeries, String> {
    let symbol = request.symbol.trim().to_uppercase();
    let span = tracing::info_span!("app.market.resolve_series", symbol = %symbol);
    let _enter = span.enter();

    if let Some(repo) = repo {
        match load_historical(repo, &symbol, request.volatility_window) {
            Ok((series, quality)) => {
                metrics::counter!("wheelforge.market.series_total", "source" => "historical")
                    .increment(1);
                tracing::debug!(bars = series.len(), "using historical bars");
                return Ok(ResolvedSeries {
                    symbol,
                    historical: true,
                    quality: Some(quality),
                    series,
                });
            }
            Err(err) => {
                let reason = if err.is_insufficient_history() {
                    "insufficient_history"
                } else {
                    "load_error"
                };
                metrics::counter!("wheelforge.market.fallbacks_total", "reason" => reason)
                    .increment(1);
                tracing::warn!(error = %err, "historical data unavailable, using synthetic series");
            }
        }
    }

    let series = synthetic_series(&symbol, request.history_days, request.end, rng)?;
    metrics::counter!("wheelforge.market.series_total", "source" => "synthetic").increment(1);
    Ok(ResolvedSeries {
        symbol,
        historical: false,
        quality: None,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::{resolve_series, SeriesRequest};
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use wheelforge_domain::errors::MarketDataError;
    use wheelforge_domain::repositories::market_data::{DailyBarsQuery, MarketDataRepository};
    use wheelforge_domain::value_objects::price_bar::PriceBar;

    struct FixedBars(Vec<PriceBar>);

    impl MarketDataRepository for FixedBars {
        fn load_daily_bars(
            &self,
            _query: &DailyBarsQuery,
        ) -> Result<Vec<PriceBar>, MarketDataError> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    impl MarketDataRepository for Offline {
        fn load_daily_bars(&self, query: &DailyBarsQuery) -> Result<Vec<PriceBar>, MarketDataError> {
            Err(MarketDataError::Unavailable(format!("{} offline", query.symbol)))
        }
    }

    fn request(symbol: &str) -> SeriesRequest<'_> {
        SeriesRequest {
            symbol,
            history_days: 120,
            volatility_window: None,
            end: NaiveDate::from_ymd_opt(2025, 6, 30).expect("date"),
        }
    }

    fn bars(count: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
        (0..count)
            .map(|i| PriceBar::close_only(start + Duration::days(i as i64), 100.0 + i as f64))
            .collect()
    }

    #[test]
    fn historical_bars_are_preferred() {
        let repo = FixedBars(bars(40));
        let mut rng = StdRng::seed_from_u64(1);
        let resolved = resolve_series(Some(&repo), request("msft"), &mut rng).expect("resolve");
        assert!(resolved.historical);
        assert_eq!(resolved.symbol, "MSFT");
        assert_eq!(resolved.series.len(), 40);
        assert!(resolved.quality.map(|q| q.is_clean()).unwrap_or(false));
    }

    #[test]
    fn short_history_falls_back_to_synthetic() {
        let repo = FixedBars(bars(19));
        let mut rng = StdRng::seed_from_u64(1);
        let resolved = resolve_series(Some(&repo), request("SPY"), &mut rng).expect("resolve");
        assert!(!resolved.historical);
        assert!(resolved.series.len() > 19);
        assert!((resolved.series.volatility() - 0.16).abs() < 1e-12);
    }

    #[test]
    fn repository_errors_and_missing_repository_fall_back() {
        let mut rng = StdRng::seed_from_u64(3);
        let offline = resolve_series(Some(&Offline), request("TSLA"), &mut rng).expect("offline");
        assert!(!offline.historical);
        let none = resolve_series(None, request("TSLA"), &mut rng).expect("none");
        assert!(!none.historical);
        assert_eq!(none.series.last().date, request("TSLA").end);
    }
}
