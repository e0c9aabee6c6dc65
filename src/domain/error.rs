//! Domain error types.
//!
//! Computation errors ([`ReturnError`]) are deterministic and never worth
//! retrying. Fetch errors ([`FetchError`]) come from the market-data provider
//! and may be transient. [`QmoneyError`] is the application-level error that
//! the CLI maps to an exit code.

use chrono::NaiveDate;
use std::fmt;

/// Failures of the price/return arithmetic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReturnError {
    #[error("candle series is empty")]
    EmptySeries,

    #[error("invalid holding period: {purchase_date} to {end_date}")]
    InvalidPeriod {
        purchase_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("annualized return undefined for growth factor {base} over {years:.4} years")]
    ArithmeticDomain { base: f64, years: f64 },

    #[error("invalid {kind} price: {value}")]
    InvalidPrice { kind: PriceKind, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Buy,
    Sell,
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceKind::Buy => write!(f, "buy"),
            PriceKind::Sell => write!(f, "sell"),
        }
    }
}

/// Failures reported by a [`MarketDataClient`](crate::ports::market_data_port::MarketDataClient).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("rate limited by provider: {reason}")]
    RateLimit { reason: String },

    #[error("malformed provider response: {reason}")]
    MalformedResponse { reason: String },
}

/// Where in the per-trade pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Fetch,
    Price,
    Compute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Price => write!(f, "price"),
            Stage::Compute => write!(f, "compute"),
        }
    }
}

/// A single trade's failure, before it is tagged with its symbol.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Compute(#[from] ReturnError),

    #[error("fetch timed out after {millis} ms")]
    TimedOut { millis: u128 },

    #[error("cancelled before completion")]
    Cancelled,
}

/// Error surfaced by a fail-fast ranking.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{symbol} failed at {stage} stage: {source}")]
pub struct RankingError {
    pub symbol: String,
    pub stage: Stage,
    pub source: TradeError,
}

/// Top-level error type for qmoney.
#[derive(Debug, thiserror::Error)]
pub enum QmoneyError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to load trades from {file}: {reason}")]
    TradeLoad { file: String, reason: String },

    #[error("invalid trade: {reason}")]
    InvalidTrade { reason: String },

    #[error("provider setup failed: {reason}")]
    Provider { reason: String },

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QmoneyError> for std::process::ExitCode {
    fn from(err: &QmoneyError) -> Self {
        let code: u8 = match err {
            QmoneyError::Io(_) => 1,
            QmoneyError::ConfigParse { .. }
            | QmoneyError::ConfigMissing { .. }
            | QmoneyError::ConfigInvalid { .. } => 2,
            QmoneyError::TradeLoad { .. } | QmoneyError::InvalidTrade { .. } => 3,
            QmoneyError::Provider { .. } => 4,
            QmoneyError::Ranking(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
