//! Stock split adjustment of historical closing prices.
//!
//! Prices recorded before a split are divided by the cumulative factor of every
//! split that took effect after them, which expresses the whole history on the
//! current share basis.

use crate::types::{DailyPricePoint, StockSplitEvent};

/// Adjusts historical closing prices for stock splits.
///
/// `daily_prices` must be sorted newest to oldest, as produced by
/// [`PayloadParser::parse_daily_prices`](crate::PayloadParser::parse_daily_prices).
/// Splits may arrive in any order.
///
/// A price dated on a split's effective date already trades on the new basis and
/// is left untouched by that split; every price strictly before it is divided by
/// the split factor. Factors of successive splits multiply.
///
/// Returns a new vector; the inputs are not modified.
#[must_use]
pub fn adjust_for_splits(
    daily_prices: &[DailyPricePoint],
    splits: &[StockSplitEvent],
) -> Vec<DailyPricePoint> {
    let mut adjusted = daily_prices.to_vec();
    if splits.is_empty() {
        return adjusted;
    }

    // Newest split first, matching the order the walk below crosses them.
    let mut ordered: Vec<&StockSplitEvent> = splits.iter().collect();
    ordered.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));

    let mut cumulative_factor = 1.0;
    let mut pending = ordered.into_iter().peekable();

    for price in &mut adjusted {
        while let Some(split) = pending.next_if(|s| price.date < s.effective_date) {
            cumulative_factor *= split.split_factor;
        }

        if cumulative_factor != 1.0 {
            price.close /= cumulative_factor;
        }
    }

    adjusted
}
