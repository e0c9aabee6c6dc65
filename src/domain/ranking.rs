//! Portfolio ranking by annualized return.
//!
//! Each trade is evaluated independently: fetch its candles for
//! `[purchase_date, end_date]`, take the opening price of the first candle as
//! the buy price and the closing price of the last candle as the sell price,
//! then annualize. Trades run concurrently up to
//! [`RankerConfig::max_concurrency`]; results are collected unordered and
//! sorted once, so completion order never leaks into the output.

use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::error::{RankingError, ReturnError, Stage, TradeError};
use crate::domain::returns::{calculate_annualized_return, AnnualizedReturn};
use crate::domain::trade::TradeRecord;
use crate::ports::market_data_port::MarketDataClient;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do when a single trade fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole ranking on the first failure.
    FailFast,
    /// Record the failure next to the successful results.
    #[default]
    Partial,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" => Ok(FailurePolicy::FailFast),
            "partial" => Ok(FailurePolicy::Partial),
            _ => Err(format!("unknown failure policy: {s}")),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::Partial => write!(f, "partial"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankerConfig {
    /// Upper bound on in-flight fetches. Zero is treated as one.
    pub max_concurrency: usize,
    /// Per-fetch deadline; `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
        }
    }
}

/// A trade that could not be evaluated, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFailure {
    pub symbol: String,
    pub stage: Stage,
    pub error: TradeError,
}

impl TradeFailure {
    pub fn new(symbol: &str, stage: Stage, error: TradeError) -> Self {
        Self {
            symbol: symbol.to_string(),
            stage,
            error,
        }
    }
}

impl From<TradeFailure> for RankingError {
    fn from(failure: TradeFailure) -> Self {
        RankingError {
            symbol: failure.symbol,
            stage: failure.stage,
            source: failure.error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingResult {
    /// Ranked best first.
    pub returns: Vec<AnnualizedReturn>,
    /// Always empty under [`FailurePolicy::FailFast`].
    pub failures: Vec<TradeFailure>,
}

impl RankingResult {
    pub fn symbols(&self) -> Vec<&str> {
        self.returns.iter().map(|r| r.symbol.as_str()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Closing price of a symbol at the end of its fetched window.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingQuote {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
}

/// Annualized return descending, then symbol ascending. Total return
/// descending is the last resort for repeated symbols.
pub fn compare_returns(a: &AnnualizedReturn, b: &AnnualizedReturn) -> Ordering {
    b.annualized_return
        .total_cmp(&a.annualized_return)
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| b.total_return.total_cmp(&a.total_return))
}

pub fn sort_returns(returns: &mut [AnnualizedReturn]) {
    returns.sort_by(compare_returns);
}

fn sort_failures(failures: &mut [TradeFailure]) {
    failures.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.stage.cmp(&b.stage)));
}

/// Files one finished trade. Under fail-fast a failure ends the run.
fn absorb<T>(
    policy: FailurePolicy,
    outcome: Result<T, TradeFailure>,
    done: &mut Vec<T>,
    failures: &mut Vec<TradeFailure>,
) -> Result<(), RankingError> {
    match outcome {
        Ok(value) => done.push(value),
        Err(failure) => match policy {
            FailurePolicy::FailFast => return Err(failure.into()),
            FailurePolicy::Partial => {
                warn!(
                    symbol = %failure.symbol,
                    stage = %failure.stage,
                    error = %failure.error,
                    "trade skipped"
                );
                failures.push(failure);
            }
        },
    }
    Ok(())
}

pub struct PortfolioRanker {
    client: Arc<dyn MarketDataClient>,
    config: RankerConfig,
}

impl PortfolioRanker {
    pub fn new(client: Arc<dyn MarketDataClient>, config: RankerConfig) -> Self {
        Self { client, config }
    }

    /// Ranks `trades` valued at `end_date`.
    pub async fn rank(
        &self,
        trades: &[TradeRecord],
        end_date: NaiveDate,
        policy: FailurePolicy,
    ) -> Result<RankingResult, RankingError> {
        self.rank_until(trades, end_date, policy, std::future::pending())
            .await
    }

    /// Like [`rank`](Self::rank), but stops when `cancel` resolves.
    ///
    /// Under [`FailurePolicy::Partial`] the trades finished so far are
    /// returned and every unfinished trade is recorded as cancelled. Under
    /// [`FailurePolicy::FailFast`] cancellation is returned as the error.
    pub async fn rank_until<C>(
        &self,
        trades: &[TradeRecord],
        end_date: NaiveDate,
        policy: FailurePolicy,
        cancel: C,
    ) -> Result<RankingResult, RankingError>
    where
        C: Future<Output = ()>,
    {
        let (mut returns, mut failures) = self
            .run(trades, policy, cancel, |trade| self.evaluate(trade, end_date))
            .await?;

        sort_returns(&mut returns);
        sort_failures(&mut failures);

        info!(
            ranked = returns.len(),
            failed = failures.len(),
            %end_date,
            %policy,
            "ranking complete"
        );
        Ok(RankingResult { returns, failures })
    }

    /// Closing price of each trade's symbol at `end_date`, cheapest first
    /// (ties by symbol). Fails on the first trade that cannot be quoted.
    pub async fn closing_quotes(
        &self,
        trades: &[TradeRecord],
        end_date: NaiveDate,
    ) -> Result<Vec<ClosingQuote>, RankingError> {
        let (mut quotes, _) = self
            .run(
                trades,
                FailurePolicy::FailFast,
                std::future::pending(),
                |trade| self.quote(trade, end_date),
            )
            .await?;

        quotes.sort_by(|a, b| a.close.total_cmp(&b.close).then_with(|| a.symbol.cmp(&b.symbol)));
        Ok(quotes)
    }

    async fn run<'a, T, F, Fut, C>(
        &'a self,
        trades: &'a [TradeRecord],
        policy: FailurePolicy,
        cancel: C,
        task: F,
    ) -> Result<(Vec<T>, Vec<TradeFailure>), RankingError>
    where
        F: Fn(&'a TradeRecord) -> Fut,
        Fut: Future<Output = Result<T, TradeFailure>>,
        C: Future<Output = ()>,
    {
        let limit = self.config.max_concurrency.max(1);
        let pending = stream::iter(trades.iter().enumerate())
            .map(|(idx, trade)| {
                let fut = task(trade);
                async move { (idx, fut.await) }
            })
            .buffer_unordered(limit);
        tokio::pin!(pending);
        tokio::pin!(cancel);

        let mut finished = vec![false; trades.len()];
        let mut done = Vec::with_capacity(trades.len());
        let mut failures = Vec::new();

        loop {
            tokio::select! {
                biased;
                _ = &mut cancel => {
                    // Keep results that were ready at the same instant as the signal.
                    while let Some(Some((idx, outcome))) = pending.next().now_or_never() {
                        finished[idx] = true;
                        absorb(policy, outcome, &mut done, &mut failures)?;
                    }

                    let unfinished: Vec<&TradeRecord> = trades
                        .iter()
                        .zip(&finished)
                        .filter(|(_, f)| !**f)
                        .map(|(t, _)| t)
                        .collect();
                    if unfinished.is_empty() {
                        break;
                    }
                    warn!(unfinished = unfinished.len(), "ranking cancelled");
                    match policy {
                        FailurePolicy::FailFast => {
                            return Err(TradeFailure::new(
                                unfinished[0].symbol(),
                                Stage::Fetch,
                                TradeError::Cancelled,
                            )
                            .into());
                        }
                        FailurePolicy::Partial => {
                            failures.extend(unfinished.into_iter().map(|t| {
                                TradeFailure::new(t.symbol(), Stage::Fetch, TradeError::Cancelled)
                            }));
                            break;
                        }
                    }
                }
                next = pending.next() => {
                    let Some((idx, outcome)) = next else {
                        break;
                    };
                    finished[idx] = true;
                    absorb(policy, outcome, &mut done, &mut failures)?;
                }
            }
        }

        Ok((done, failures))
    }

    async fn evaluate(
        &self,
        trade: &TradeRecord,
        end_date: NaiveDate,
    ) -> Result<AnnualizedReturn, TradeFailure> {
        let symbol = trade.symbol();
        let purchase_date = trade.purchase_date();
        let fail = |stage: Stage, error: TradeError| TradeFailure::new(symbol, stage, error);

        if purchase_date >= end_date {
            return Err(fail(
                Stage::Compute,
                ReturnError::InvalidPeriod {
                    purchase_date,
                    end_date,
                }
                .into(),
            ));
        }

        let series = self
            .fetch_series(symbol, purchase_date, end_date)
            .await
            .map_err(|e| fail(Stage::Fetch, e))?;

        let buy_price = series
            .opening_price()
            .map_err(|e| fail(Stage::Price, e.into()))?;
        let sell_price = series
            .closing_price()
            .map_err(|e| fail(Stage::Price, e.into()))?;

        let result =
            calculate_annualized_return(symbol, purchase_date, end_date, buy_price, sell_price)
                .map_err(|e| fail(Stage::Compute, e.into()))?;

        debug!(
            symbol,
            buy_price,
            sell_price,
            annualized = result.annualized_return,
            "trade evaluated"
        );
        Ok(result)
    }

    async fn quote(
        &self,
        trade: &TradeRecord,
        end_date: NaiveDate,
    ) -> Result<ClosingQuote, TradeFailure> {
        let symbol = trade.symbol();
        let series = self
            .fetch_series(symbol, trade.purchase_date(), end_date)
            .await
            .map_err(|e| TradeFailure::new(symbol, Stage::Fetch, e))?;

        let close = series
            .closing_price()
            .map_err(|e| TradeFailure::new(symbol, Stage::Price, e.into()))?;
        let date = series.last_date().unwrap_or(end_date);

        Ok(ClosingQuote {
            symbol: symbol.to_string(),
            date,
            close,
        })
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CandleSeries, TradeError> {
        debug!(symbol, %start, %end, "fetching candles");
        let request = self.client.fetch_candles(symbol, start, end);
        let candles: Vec<Candle> = match self.config.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| TradeError::TimedOut {
                    millis: limit.as_millis(),
                })??,
            None => request.await?,
        };
        let series = CandleSeries::new(symbol, candles);
        debug!(
            symbol = series.symbol(),
            candles = series.len(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "candles fetched"
        );
        Ok(series)
    }
}
