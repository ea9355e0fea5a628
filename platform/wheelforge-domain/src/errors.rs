use chrono::NaiveDate;
use thiserror::Error;

/// Failure to acquire historical bars from a [`MarketDataRepository`].
///
/// This is the one recoverable failure the domain surfaces to callers; the
/// application layer answers it by falling back to a synthetic series.
///
/// [`MarketDataRepository`]: crate::repositories::market_data::MarketDataRepository
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("no market data for symbol {0}")]
    NotFound(String),

    #[error("market data source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed market data: {0}")]
    Malformed(String),

    #[error("insufficient history for {symbol}: {bars} bars, need at least {required}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        required: usize,
    },
}

impl MarketDataError {
    #[must_use]
    pub fn is_insufficient_history(&self) -> bool {
        matches!(self, Self::InsufficientHistory { .. })
    }
}

/// Violations of the price-series invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("price series has no bars")]
    Empty,

    #[error("non-positive or non-finite close on {0}")]
    InvalidClose(NaiveDate),

    #[error("bar dated {0} is out of chronological order")]
    OutOfOrder(NaiveDate),

    #[error("duplicate bar for {0}")]
    DuplicateDate(NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("initial_cash must be positive and finite, got {0}")]
    InitialCash(f64),

    #[error("otm_pct must be within (0, 1), got {0}")]
    OtmPct(f64),

    #[error("days_to_expiry must be at least 1")]
    DaysToExpiry,

    #[error("contracts must be at least 1")]
    Contracts,

    #[error("risk_free_rate must be finite, got {0}")]
    RiskFreeRate(f64),
}
