//! Core domain types and logic.

pub mod candle;
pub mod config_validation;
pub mod error;
pub mod ranking;
pub mod returns;
pub mod trade;
