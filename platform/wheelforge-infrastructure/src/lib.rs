pub mod chain;
pub mod market_data;
