//! Provider traits for fetching and parsing raw market data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`RawDataFetcher`] - Raw payloads for daily prices, earnings and splits
//! - [`PayloadParser`] - Turns raw payloads into typed records

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{AnnualEarningPoint, DailyPricePoint, StockSplitEvent, Symbol},
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider of raw, unparsed payloads.
///
/// Implementations return the response body untouched; interpretation is left
/// to a [`PayloadParser`].
#[async_trait]
pub trait RawDataFetcher: DataProvider {
    /// Fetches the full daily price history for a symbol.
    async fn fetch_daily_prices(&self, symbol: &Symbol) -> Result<Vec<u8>>;

    /// Fetches the annual earnings history for a symbol.
    async fn fetch_earnings(&self, symbol: &Symbol) -> Result<Vec<u8>>;

    /// Fetches the stock split history for a symbol.
    async fn fetch_stock_splits(&self, symbol: &Symbol) -> Result<Vec<u8>>;
}

/// Parser for raw provider payloads.
///
/// With `skip_errors` set, individual records that fail to parse are dropped with
/// a warning instead of failing the whole payload.
pub trait PayloadParser: Send + Sync + Debug {
    /// Parses daily prices, sorted newest to oldest.
    fn parse_daily_prices(&self, payload: &[u8], skip_errors: bool)
    -> Result<Vec<DailyPricePoint>>;

    /// Parses annual earnings in payload order.
    fn parse_annual_earnings(
        &self,
        payload: &[u8],
        skip_errors: bool,
    ) -> Result<Vec<AnnualEarningPoint>>;

    /// Parses stock splits. Unparsable split records are always skipped.
    fn parse_stock_splits(&self, payload: &[u8]) -> Result<Vec<StockSplitEvent>>;
}
