//! Core domain types and the backtest engine.

pub mod backtest;
pub mod batch;
pub mod benchmark;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod portfolio;
pub mod position;
pub mod signal;
pub mod strategy;
