//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_trade_adapter;
pub mod report_adapter;
#[cfg(feature = "tiingo")]
pub mod tiingo_adapter;
