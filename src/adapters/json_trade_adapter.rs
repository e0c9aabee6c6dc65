//! JSON trade file adapter.
//!
//! Expects an array of objects:
//!
//! ```json
//! [{"symbol": "AAPL", "quantity": 100, "tradeType": "BUY", "purchaseDate": "2019-01-02"}]
//! ```
//!
//! Unknown keys such as `tradeType` are ignored.

use crate::domain::error::QmoneyError;
use crate::domain::trade::TradeRecord;
use crate::ports::trade_port::TradeLoader;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeEntry {
    symbol: String,
    quantity: f64,
    purchase_date: NaiveDate,
}

pub struct JsonTradeLoader {
    path: PathBuf,
}

impl JsonTradeLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Parses a trade array. `source` names the input in error messages.
pub fn parse_trades(content: &str, source: &str) -> Result<Vec<TradeRecord>, QmoneyError> {
    let entries: Vec<TradeEntry> =
        serde_json::from_str(content).map_err(|e| QmoneyError::TradeLoad {
            file: source.to_string(),
            reason: e.to_string(),
        })?;

    entries
        .into_iter()
        .map(|e| TradeRecord::new(&e.symbol, e.quantity, e.purchase_date))
        .collect()
}

impl TradeLoader for JsonTradeLoader {
    fn load_trades(&self) -> Result<Vec<TradeRecord>, QmoneyError> {
        let source = self.path.display().to_string();
        let content = fs::read_to_string(&self.path).map_err(|e| QmoneyError::TradeLoad {
            file: source.clone(),
            reason: e.to_string(),
        })?;
        parse_trades(&content, &source)
    }
}
