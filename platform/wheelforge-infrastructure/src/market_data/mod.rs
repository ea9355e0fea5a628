mod csv_bars;
mod in_memory;

pub use csv_bars::{load_daily_csv, CsvMarketDataRepository, DailyBarRecord};
pub use in_memory::InMemoryMarketDataRepository;

use wheelforge_domain::repositories::market_data::DailyBarsQuery;
use wheelforge_domain::value_objects::price_bar::PriceBar;

/// Keeps bars inside the query's inclusive date range.
pub(crate) fn filter_range(bars: Vec<PriceBar>, query: &DailyBarsQuery) -> Vec<PriceBar> {
    bars.into_iter()
        .filter(|bar| query.from.map_or(true, |from| bar.date >= from))
        .filter(|bar| query.to.map_or(true, |to| bar.date <= to))
        .collect()
}
