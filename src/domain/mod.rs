//! Core domain types and logic.

pub mod ohlcv;
pub mod frame;
pub mod transform;
pub mod registry;
pub mod indicator;
pub mod strategy;
pub mod pipeline;
pub mod simulation;
pub mod metrics;
pub mod projection;
pub mod report;
pub mod backtest;
pub mod config_validation;
pub mod error;
