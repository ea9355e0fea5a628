pub mod config;
pub mod market;
pub mod optimizer;
mod shared;
pub mod simulation;
