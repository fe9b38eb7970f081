//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod portfolio;
pub mod position;
pub mod price_series;
pub mod signal;
pub mod strategy;
