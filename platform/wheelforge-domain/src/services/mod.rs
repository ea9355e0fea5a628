pub mod backtest;
pub mod bars;
pub mod chain;
pub mod exposure;
pub mod playbook;
pub mod prediction;
pub mod price_series;
pub mod pricing;
pub mod risk;
pub mod wheel;
