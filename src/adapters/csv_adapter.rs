//! CSV directory market-data adapter.
//!
//! Reads `{data_dir}/{SYMBOL}.csv` files with a `date,open,high,low,close,volume`
//! header. `high`, `low` and `volume` may be left empty.

use crate::domain::candle::Candle;
use crate::domain::error::FetchError;
use crate::ports::market_data_port::MarketDataClient;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvCandleClient {
    base_path: PathBuf,
}

impl CsvCandleClient {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

/// Parses candle rows, keeping those dated within `[start, end]`.
pub fn parse_candles(
    content: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Candle>, FetchError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut candles = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| FetchError::MalformedResponse {
            reason: format!("CSV parse error: {}", e),
        })?;
        let row = line + 2;

        let date_str = record.get(0).ok_or_else(|| FetchError::MalformedResponse {
            reason: format!("row {row}: missing date column"),
        })?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
            FetchError::MalformedResponse {
                reason: format!("row {row}: invalid date format: {}", e),
            }
        })?;

        if date < start || date > end {
            continue;
        }

        let open = required_price(&record, 1, "open", row)?;
        let close = required_price(&record, 4, "close", row)?;

        candles.push(Candle {
            date,
            open,
            close,
            high: optional_number(&record, 2, "high", row)?,
            low: optional_number(&record, 3, "low", row)?,
            volume: optional_number(&record, 5, "volume", row)?,
        });
    }

    candles.sort_by_key(|c| c.date);
    Ok(candles)
}

fn required_price(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    row: usize,
) -> Result<f64, FetchError> {
    optional_number(record, idx, name, row)?.ok_or_else(|| FetchError::MalformedResponse {
        reason: format!("row {row}: missing {name} column"),
    })
}

fn optional_number(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    row: usize,
) -> Result<Option<f64>, FetchError> {
    match record.get(idx).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| FetchError::MalformedResponse {
                reason: format!("row {row}: invalid {name} value: {}", e),
            }),
    }
}

#[async_trait]
impl MarketDataClient for CsvCandleClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, FetchError> {
        let path = self.csv_path(symbol);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::Network {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;
        parse_candles(&content, start, end)
    }
}
