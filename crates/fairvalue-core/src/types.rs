//! Core data types for fair value analysis.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`DailyPricePoint`] - Daily closing price
//! - [`AnnualEarningPoint`] - Reported annual earnings per share
//! - [`StockSplitEvent`] - Stock split (forward or reverse)
//! - [`FairValuePoint`] - Projected fair value price
//! - [`CombinedPoint`] - Long-format row tagged with its [`Series`]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::series::Series;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A single day's closing price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyPricePoint {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Trading day.
    pub date: NaiveDate,
    /// Closing price.
    pub close: f64,
}

impl DailyPricePoint {
    /// Creates a new daily price point.
    #[must_use]
    pub const fn new(symbol: Symbol, date: NaiveDate, close: f64) -> Self {
        Self {
            symbol,
            date,
            close,
        }
    }
}

/// Reported earnings per share for one fiscal year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnualEarningPoint {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Last day of the fiscal year.
    pub fiscal_date_ending: NaiveDate,
    /// Reported EPS. May be zero or negative for loss-making years.
    pub reported_eps: f64,
}

impl AnnualEarningPoint {
    /// Creates a new annual earning point.
    #[must_use]
    pub const fn new(symbol: Symbol, fiscal_date_ending: NaiveDate, reported_eps: f64) -> Self {
        Self {
            symbol,
            fiscal_date_ending,
            reported_eps,
        }
    }

    /// Returns true if this year was profitable.
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.reported_eps > 0.0
    }
}

/// A stock split.
///
/// A factor above 1 is a forward split (2.0 = 2-for-1); a factor below 1 is a
/// reverse split (0.1 = 1-for-10).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockSplitEvent {
    /// Stock symbol.
    pub symbol: Symbol,
    /// First trading day on the post-split basis.
    pub effective_date: NaiveDate,
    /// Share-count multiplier.
    pub split_factor: f64,
}

impl StockSplitEvent {
    /// Creates a new stock split event.
    #[must_use]
    pub const fn new(symbol: Symbol, effective_date: NaiveDate, split_factor: f64) -> Self {
        Self {
            symbol,
            effective_date,
            split_factor,
        }
    }
}

/// A projected fair value price, dated at the fiscal year end it was derived from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FairValuePoint {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Fiscal date ending of the source earnings record.
    pub date: NaiveDate,
    /// Fair value price.
    pub fair_value_price: f64,
}

/// One row of the long-format combined series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedPoint {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Date of the observation or projection.
    pub date: NaiveDate,
    /// Price value.
    pub price: f64,
    /// Series this row belongs to.
    pub series: Series,
}

impl From<&DailyPricePoint> for CombinedPoint {
    fn from(point: &DailyPricePoint) -> Self {
        Self {
            symbol: point.symbol.clone(),
            date: point.date,
            price: point.close,
            series: Series::DailyPrice,
        }
    }
}

impl From<&FairValuePoint> for CombinedPoint {
    fn from(point: &FairValuePoint) -> Self {
        Self {
            symbol: point.symbol.clone(),
            date: point.date,
            price: point.fair_value_price,
            series: Series::FairValue,
        }
    }
}
