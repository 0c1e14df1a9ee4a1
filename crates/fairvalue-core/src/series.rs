//! Series tags for long-format price data.
//!
//! This module defines [`Series`], the tag column that distinguishes observed daily
//! prices from projected fair values when both share one row shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Logical series a combined price row belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    /// Split-adjusted daily closing price.
    DailyPrice,
    /// Projected fair value price.
    FairValue,
}

impl Series {
    /// Returns the tag as written to persisted artifacts.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DailyPrice => "daily_price",
            Self::FairValue => "fair_value",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Series {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily_price" => Ok(Self::DailyPrice),
            "fair_value" => Ok(Self::FairValue),
            other => Err(DataError::Parse(format!("Unknown series tag: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_tags() {
        assert_eq!(Series::DailyPrice.as_str(), "daily_price");
        assert_eq!("fair_value".parse::<Series>().unwrap(), Series::FairValue);
        assert!("actual_price".parse::<Series>().is_err());
    }
}
