pub mod metrics;
pub mod position;
pub mod price_series;
pub mod simulation;
