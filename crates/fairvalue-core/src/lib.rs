#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairvalue/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits, types and numeric components for earnings-based fair value curves.
//!
//! This crate provides the foundational abstractions and pure computations:
//!
//! - [`RawDataFetcher`](provider::RawDataFetcher) - Raw payload retrieval
//! - [`PayloadParser`](provider::PayloadParser) - Payload to typed records
//! - [`CombinedSeriesStore`](store::CombinedSeriesStore) - Persistence of combined series
//! - [`adjust_for_splits`](split::adjust_for_splits) - Stock split adjustment
//! - [`DateRange`](range::DateRange) - Inclusive date window filtering
//! - [`valuate`](valuation::valuate) - CAGR-based fair value projection
//! - [`combine`](combine::combine) - Long-format series merging

/// Long-format series merging.
pub mod combine;
/// Error types for data and valuation operations.
pub mod error;
/// Provider traits for fetching and parsing raw data.
pub mod provider;
/// Inclusive date-range filtering.
pub mod range;
/// Series tags for combined rows.
pub mod series;
/// Stock split adjustment.
pub mod split;
/// Store trait for persisting combined series.
pub mod store;
/// Core data types (Symbol, prices, earnings, splits, etc.).
pub mod types;
/// Graham/Lynch fair value estimation.
pub mod valuation;

// Re-export commonly used items at crate root
pub use combine::{combine, split_series};
pub use error::{DataError, Result, ValuationError, ValuationStep};
pub use provider::{DataProvider, PayloadParser, RawDataFetcher};
pub use range::{
    DATE_FORMAT, DateRange, Dated, filter_annual_earnings_within_range,
    filter_daily_prices_within_range, filter_within_range,
};
pub use series::Series;
pub use split::adjust_for_splits;
pub use store::{CombinedSeriesStore, WriteReceipt};
pub use types::{
    AnnualEarningPoint, CombinedPoint, DailyPricePoint, FairValuePoint, StockSplitEvent, Symbol,
};
pub use valuation::{
    FairValueModel, GrowthEndpoints, calculate_fair_value_history, cagr, fair_value_history,
    fair_value_pe, profitable_endpoints, valuate,
};
