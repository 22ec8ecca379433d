//! Core domain types and logic.

pub mod alignment;
pub mod backtest;
pub mod config_validation;
pub mod daily_bar;
pub mod error;
pub mod market_data;
pub mod metrics;
pub mod portfolio;
pub mod summary;
pub mod trade;
