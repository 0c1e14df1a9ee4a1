//! Long-format merging of observed and projected prices.

use crate::{
    series::Series,
    types::{CombinedPoint, DailyPricePoint, FairValuePoint},
};

/// Merges daily prices and fair values into one tagged series.
///
/// Daily prices come first, then fair values; each group keeps its input order.
/// Nothing is filtered or deduplicated.
#[must_use]
pub fn combine(
    daily_prices: &[DailyPricePoint],
    fair_values: &[FairValuePoint],
) -> Vec<CombinedPoint> {
    let mut combined = Vec::with_capacity(daily_prices.len() + fair_values.len());
    combined.extend(daily_prices.iter().map(CombinedPoint::from));
    combined.extend(fair_values.iter().map(CombinedPoint::from));
    combined
}

/// Splits a combined series back into its daily prices and fair values.
#[must_use]
pub fn split_series(records: &[CombinedPoint]) -> (Vec<DailyPricePoint>, Vec<FairValuePoint>) {
    let mut daily_prices = Vec::new();
    let mut fair_values = Vec::new();

    for record in records {
        match record.series {
            Series::DailyPrice => daily_prices.push(DailyPricePoint::new(
                record.symbol.clone(),
                record.date,
                record.price,
            )),
            Series::FairValue => fair_values.push(FairValuePoint {
                symbol: record.symbol.clone(),
                date: record.date,
                fair_value_price: record.price,
            }),
        }
    }

    (daily_prices, fair_values)
}
