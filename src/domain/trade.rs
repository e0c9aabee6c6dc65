//! Trade records to be ranked.

use crate::domain::error::QmoneyError;
use chrono::NaiveDate;

/// One position to evaluate. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    symbol: String,
    quantity: f64,
    purchase_date: NaiveDate,
}

impl TradeRecord {
    /// Symbols are trimmed and upper-cased. Rejects empty symbols and
    /// non-positive quantities.
    pub fn new(
        symbol: &str,
        quantity: f64,
        purchase_date: NaiveDate,
    ) -> Result<Self, QmoneyError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(QmoneyError::InvalidTrade {
                reason: "symbol must not be empty".into(),
            });
        }
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(QmoneyError::InvalidTrade {
                reason: format!("quantity for {symbol} must be positive, got {quantity}"),
            });
        }
        Ok(Self {
            symbol,
            quantity,
            purchase_date,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn purchase_date(&self) -> NaiveDate {
        self.purchase_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_normalizes_symbol() {
        let trade = TradeRecord::new(" aapl ", 50.0, date(2019, 1, 2)).unwrap();
        assert_eq!(trade.symbol(), "AAPL");
        assert_eq!(trade.quantity(), 50.0);
        assert_eq!(trade.purchase_date(), date(2019, 1, 2));
    }

    #[test]
    fn new_rejects_empty_symbol() {
        let err = TradeRecord::new("   ", 1.0, date(2019, 1, 2)).unwrap_err();
        assert!(matches!(err, QmoneyError::InvalidTrade { .. }));
    }

    #[test]
    fn new_rejects_non_positive_quantity() {
        assert!(TradeRecord::new("MSFT", 0.0, date(2019, 1, 2)).is_err());
        assert!(TradeRecord::new("MSFT", -5.0, date(2019, 1, 2)).is_err());
        assert!(TradeRecord::new("MSFT", f64::NAN, date(2019, 1, 2)).is_err());
    }
}
