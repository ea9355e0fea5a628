use crate::errors::MarketDataError;
use crate::value_objects::price_bar::PriceBar;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyBarsQuery {
    pub symbol: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DailyBarsQuery {
    pub fn all(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            from: None,
            to: None,
        }
    }
}

pub trait MarketDataRepository {
    /// Daily bars for `query.symbol`, oldest first.
    fn load_daily_bars(&self, query: &DailyBarsQuery) -> Result<Vec<PriceBar>, MarketDataError>;
}
