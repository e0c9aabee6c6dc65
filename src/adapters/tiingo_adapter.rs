//! Tiingo end-of-day prices adapter.
//!
//! `GET {base_url}/{SYMBOL}/prices?startDate=..&endDate=..&token=..` returns a
//! JSON array of daily bars whose `date` is an RFC 3339 timestamp.

use crate::domain::candle::Candle;
use crate::domain::error::{FetchError, QmoneyError};
use crate::ports::market_data_port::MarketDataClient;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.tiingo.com/tiingo/daily";
pub const TOKEN_ENV_VAR: &str = "QMONEY_TIINGO_TOKEN";

pub struct TiingoClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl TiingoClient {
    pub fn new(base_url: &str, token: String) -> Result<Self, QmoneyError> {
        let client = Client::builder()
            .user_agent(concat!("qmoney/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QmoneyError::Provider {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: SecretString::new(token.into()),
        })
    }

    pub fn prices_url(&self, symbol: &str) -> String {
        format!("{}/{}/prices", self.base_url, symbol)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiingoBar {
    date: DateTime<Utc>,
    open: f64,
    close: f64,
    high: Option<f64>,
    low: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TiingoErrorBody {
    detail: String,
}

/// Decodes a prices response body.
pub fn parse_prices(body: &str) -> Result<Vec<Candle>, FetchError> {
    let bars: Vec<TiingoBar> =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse {
            reason: format!("unexpected prices payload: {}", e),
        })?;

    Ok(bars
        .into_iter()
        .map(|b| Candle {
            date: b.date.date_naive(),
            open: b.open,
            close: b.close,
            high: b.high,
            low: b.low,
            volume: b.volume,
        })
        .collect())
}

/// Maps a non-success HTTP status to a fetch error.
pub fn check_status(status: StatusCode, body: &str) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }

    let detail = serde_json::from_str::<TiingoErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    if status == StatusCode::TOO_MANY_REQUESTS {
        Err(FetchError::RateLimit { reason: detail })
    } else {
        Err(FetchError::Network {
            reason: format!("HTTP {}: {}", status.as_u16(), detail),
        })
    }
}

#[async_trait]
impl MarketDataClient for TiingoClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, FetchError> {
        let url = self.prices_url(symbol);
        debug!(%url, %start, %end, "requesting tiingo prices");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("startDate", start.to_string()),
                ("endDate", end.to_string()),
                ("token", self.token.expose_secret().to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network {
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Network {
            reason: e.without_url().to_string(),
        })?;

        check_status(status, &body)?;
        parse_prices(&body)
    }
}
