use super::filter_range;
use std::collections::HashMap;
use wheelforge_domain::errors::MarketDataError;
use wheelforge_domain::repositories::market_data::{DailyBarsQuery, MarketDataRepository};
use wheelforge_domain::value_objects::price_bar::PriceBar;

#[derive(Debug, Default, Clone)]
pub struct InMemoryMarketDataRepository {
    bars: HashMap<String, Vec<PriceBar>>,
}

impl InMemoryMarketDataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    pub fn insert(&mut self, symbol: &str, bars: Vec<PriceBar>) {
        self.bars.insert(symbol.trim().to_uppercase(), bars);
    }
}

impl MarketDataRepository for InMemoryMarketDataRepository {
    fn load_daily_bars(&self, query: &DailyBarsQuery) -> Result<Vec<PriceBar>, MarketDataError> {
        let key = query.symbol.trim().to_uppercase();
        self.bars
            .get(&key)
            .map(|bars| filter_range(bars.clone(), query))
            .ok_or(MarketDataError::NotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryMarketDataRepository;
    use chrono::NaiveDate;
    use wheelforge_domain::repositories::market_data::{DailyBarsQuery, MarketDataRepository};
    use wheelforge_domain::value_objects::price_bar::PriceBar;

    #[test]
    fn lookup_is_case_insensitive_and_range_filtered() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 2, d).expect("date");
        let repo = InMemoryMarketDataRepository::new().with_symbol(
            "amd",
            vec![PriceBar::close_only(day(3), 1.0), PriceBar::close_only(day(4), 2.0)],
        );
        let mut query = DailyBarsQuery::all("AMD");
        assert_eq!(repo.load_daily_bars(&query).expect("bars").len(), 2);
        query.to = Some(day(3));
        assert_eq!(repo.load_daily_bars(&query).expect("bars").len(), 1);
        assert!(repo.load_daily_bars(&DailyBarsQuery::all("INTC")).is_err());
    }
}
