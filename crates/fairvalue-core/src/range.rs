//! Inclusive date-range filtering for dated records.

use chrono::NaiveDate;

use crate::{
    error::{DataError, Result},
    types::{AnnualEarningPoint, DailyPricePoint},
};

/// Date layout accepted for range boundaries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record that can be placed on a calendar.
pub trait Dated {
    /// Returns the record's date, or `None` if it cannot be determined.
    fn date(&self) -> Option<NaiveDate>;
}

impl Dated for DailyPricePoint {
    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Dated for AnnualEarningPoint {
    fn date(&self) -> Option<NaiveDate> {
        Some(self.fiscal_date_ending)
    }
}

/// An inclusive date window, unbounded on either side when a boundary is absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range from already-parsed boundaries.
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Parses a range from `YYYY-MM-DD` boundary strings.
    ///
    /// `None` and empty strings leave that side unbounded.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidDateFormat`] if a non-empty boundary does not parse.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: parse_boundary(start)?,
            end: parse_boundary(end)?,
        })
    }

    /// Lower bound, if any.
    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// Upper bound, if any.
    #[must_use]
    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Returns true if `date` falls within the range, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// Returns the records inside the range, in their original order.
    ///
    /// Records without a resolvable date are skipped.
    #[must_use]
    pub fn filter<T: Dated + Clone>(&self, records: &[T]) -> Vec<T> {
        records
            .iter()
            .filter(|record| record.date().is_some_and(|date| self.contains(date)))
            .cloned()
            .collect()
    }
}

fn parse_boundary(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|e| DataError::InvalidDateFormat {
                value: s.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Filters records to an inclusive window given as `YYYY-MM-DD` strings.
///
/// # Errors
/// Returns [`DataError::InvalidDateFormat`] if a non-empty boundary does not parse.
pub fn filter_within_range<T: Dated + Clone>(
    records: &[T],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<T>> {
    Ok(DateRange::parse(start, end)?.filter(records))
}

/// Filters daily prices to an inclusive window.
///
/// # Errors
/// Returns [`DataError::InvalidDateFormat`] if a non-empty boundary does not parse.
pub fn filter_daily_prices_within_range(
    records: &[DailyPricePoint],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<DailyPricePoint>> {
    filter_within_range(records, start, end)
}

/// Filters annual earnings to an inclusive window.
///
/// # Errors
/// Returns [`DataError::InvalidDateFormat`] if a non-empty boundary does not parse.
pub fn filter_annual_earnings_within_range(
    records: &[AnnualEarningPoint],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<AnnualEarningPoint>> {
    filter_within_range(records, start, end)
}
