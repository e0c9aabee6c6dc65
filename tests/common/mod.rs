#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use qmoney::domain::candle::Candle;
use qmoney::domain::error::FetchError;
use qmoney::domain::trade::TradeRecord;
use qmoney::ports::market_data_port::MarketDataClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory market data with optional per-symbol errors and delays.
///
/// Unknown symbols return an empty candle list. Tracks how many fetches were
/// in flight at once.
#[derive(Default)]
pub struct MockMarketData {
    pub candles: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, FetchError>,
    pub delays: HashMap<String, Duration>,
    pub default_delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, error: FetchError) -> Self {
        self.errors.insert(symbol.to_string(), error);
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataClient for MockMarketData {
    async fn fetch_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(symbol).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = self.errors.get(symbol) {
            return Err(err.clone());
        }
        Ok(self
            .candles
            .get(symbol)
            .map(|cs| {
                cs.iter()
                    .filter(|c| c.date >= start && c.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn trade(symbol: &str, purchase_date: NaiveDate) -> TradeRecord {
    TradeRecord::new(symbol, 10.0, purchase_date).unwrap()
}

/// Two candles: `open` on `start`, `close` on `end`.
pub fn candles(start: NaiveDate, end: NaiveDate, open: f64, close: f64) -> Vec<Candle> {
    vec![Candle::new(start, open, open), Candle::new(end, close, close)]
}

pub const PURCHASE: (i32, u32, u32) = (2019, 1, 2);
pub const END: (i32, u32, u32) = (2019, 12, 12);

pub fn purchase_date() -> NaiveDate {
    date(PURCHASE.0, PURCHASE.1, PURCHASE.2)
}

pub fn end_date() -> NaiveDate {
    date(END.0, END.1, END.2)
}

/// AAPL, MSFT and GOOGL bought at 100 on 2019-01-02.
pub fn sample_market() -> MockMarketData {
    let (start, end) = (purchase_date(), end_date());
    MockMarketData::new()
        .with_candles("AAPL", candles(start, end, 100.0, 175.23))
        .with_candles("MSFT", candles(start, end, 100.0, 154.22))
        .with_candles("GOOGL", candles(start, end, 100.0, 130.81))
}

pub fn sample_trades() -> Vec<TradeRecord> {
    ["MSFT", "GOOGL", "AAPL"]
        .iter()
        .map(|s| trade(s, purchase_date()))
        .collect()
}
