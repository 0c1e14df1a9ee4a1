#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairvalue/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage data provider.
//!
//! This crate implements the fairvalue-core fetcher and parser traits for the
//! [Alpha Vantage](https://www.alphavantage.co/) API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fairvalue_alphavantage::{AlphaVantageParser, AlphaVantageProvider};
//! use fairvalue_core::{PayloadParser, RawDataFetcher, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AlphaVantageProvider::new("your_api_key");
//!     let symbol = Symbol::new("IBM");
//!
//!     let payload = provider.fetch_earnings(&symbol).await?;
//!     let earnings = AlphaVantageParser.parse_annual_earnings(&payload, true)?;
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use fairvalue_core::{DataError, DataProvider, RawDataFetcher, Result, Symbol};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

mod parse;
pub use parse::AlphaVantageParser;

/// Base URL for the live Alpha Vantage API.
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

/// Base URL of the local mock server used during development.
pub const MOCK_BASE_URL: &str = "http://localhost:8080";

/// Request timeout applied by [`AlphaVantageProvider::new`].
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const PROVIDER_NAME: &str = "Alpha Vantage";

/// Alpha Vantage data provider.
///
/// Provides raw access to:
/// - Full daily price history (`TIME_SERIES_DAILY`)
/// - Annual and quarterly earnings (`EARNINGS`)
/// - Stock split history (`SPLITS`)
#[derive(Clone)]
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for AlphaVantageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AlphaVantageProvider {
    /// Create a new provider for the live API with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(build_client(DEFAULT_TIMEOUT), api_key)
    }

    /// Create a new provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different server, such as a local mock.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a query URL for an API function with the API key appended.
    fn url(&self, function: &str, symbol: &Symbol, extra: &str) -> String {
        format!(
            "{}/query?function={function}&symbol={}{extra}&apikey={}",
            self.base_url,
            symbol.as_str(),
            self.api_key
        )
    }

    /// Make a GET request and return the raw body.
    async fn get(&self, function: &str, symbol: &Symbol, extra: &str) -> Result<Vec<u8>> {
        let url = self.url(function, symbol, extra);
        tracing::debug!(function, symbol = %symbol, "Alpha Vantage request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DataError::Network(format!("HTTP {status}: {text}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        check_api_message(&body)?;
        Ok(body.to_vec())
    }
}

/// Client with a request timeout, or the default client if TLS setup fails.
fn build_client(timeout: Duration) -> Client {
    match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(
                error = %e,
                timeout_secs = timeout.as_secs(),
                "Failed to build HTTP client, falling back to default client without timeout"
            );
            Client::default()
        }
    }
}

/// Alpha Vantage reports errors and throttling with HTTP 200 and a message body.
fn check_api_message(body: &[u8]) -> Result<()> {
    let text = String::from_utf8_lossy(body);

    if text.contains("\"Error Message\"") {
        return Err(DataError::Network(text.into_owned()));
    }

    if text.contains("\"Note\"") || text.contains("\"Information\"") {
        tracing::warn!("Alpha Vantage throttled the request: {}", text);
        return Err(DataError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after: None,
        });
    }

    Ok(())
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Alpha Vantage - Daily prices, earnings and corporate actions API"
    }
}

#[async_trait]
impl RawDataFetcher for AlphaVantageProvider {
    async fn fetch_daily_prices(&self, symbol: &Symbol) -> Result<Vec<u8>> {
        self.get("TIME_SERIES_DAILY", symbol, "&outputsize=full")
            .await
    }

    async fn fetch_earnings(&self, symbol: &Symbol) -> Result<Vec<u8>> {
        self.get("EARNINGS", symbol, "").await
    }

    async fn fetch_stock_splits(&self, symbol: &Symbol) -> Result<Vec<u8>> {
        self.get("SPLITS", symbol, "").await
    }
}
