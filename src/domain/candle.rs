//! Daily price bars and per-symbol candle series.

use crate::domain::error::ReturnError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

impl Candle {
    /// Candle with only the prices the ranking engine uses.
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self {
            date,
            open,
            close,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// Candles for one symbol, ascending by date.
///
/// Provider gaps (weekends, holidays) are expected and not filled.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    symbol: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: &str, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.date);
        Self {
            symbol: symbol.to_string(),
            candles,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.candles.first().map(|c| c.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.candles.last().map(|c| c.date)
    }

    /// `open` of the earliest candle.
    pub fn opening_price(&self) -> Result<f64, ReturnError> {
        self.candles
            .first()
            .map(|c| c.open)
            .ok_or(ReturnError::EmptySeries)
    }

    /// `close` of the latest candle.
    pub fn closing_price(&self) -> Result<f64, ReturnError> {
        self.candles
            .last()
            .map(|c| c.close)
            .ok_or(ReturnError::EmptySeries)
    }
}
