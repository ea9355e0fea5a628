pub mod equity_point;
pub mod greeks;
pub mod instrument;
pub mod option_side;
pub mod price_bar;
pub mod strategy_params;
pub mod trade;
