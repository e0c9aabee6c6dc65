//! Market-data access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::FetchError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of daily candles for a symbol.
///
/// Implementations are injected into the ranker and may be called
/// concurrently for different symbols. Retrying transient failures, if
/// wanted, is the implementation's job.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Daily candles covering `[start, end]`, in any order.
    async fn fetch_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, FetchError>;
}
