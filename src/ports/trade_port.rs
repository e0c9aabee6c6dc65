//! Trade list source port trait.

use crate::domain::error::QmoneyError;
use crate::domain::trade::TradeRecord;

pub trait TradeLoader {
    /// Trades in source order.
    fn load_trades(&self) -> Result<Vec<TradeRecord>, QmoneyError>;
}
