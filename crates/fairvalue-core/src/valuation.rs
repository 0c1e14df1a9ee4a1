//! Graham/Lynch fair value estimation from annual earnings.
//!
//! The model ties a "fair" price to earnings growth:
//!
//! ```text
//! CAGR             = (ending EPS / beginning EPS)^(1 / years) - 1
//! fair value P/E   = CAGR × 100
//! fair value price = reported EPS × fair value P/E
//! ```
//!
//! CAGR is undefined across a sign change, so loss-making early years are excluded
//! from the growth window and loss-making years leave gaps in the projected curve.
//! The chosen window strongly drives the result; narrow the earnings history with
//! [`DateRange`](crate::DateRange) to compare recent growth with long-run growth.

use chrono::NaiveDate;

use crate::{
    error::ValuationError,
    types::{AnnualEarningPoint, FairValuePoint},
};

/// Minimum number of earnings records needed to measure growth.
pub const MIN_EARNINGS_RECORDS: usize = 2;

/// Average days per year, accounting for leap years.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Start and end records of the growth window.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthEndpoints {
    /// First profitable year.
    pub start: AnnualEarningPoint,
    /// Most recent year.
    pub end: AnnualEarningPoint,
}

impl GrowthEndpoints {
    /// Elapsed years between the start and end fiscal dates.
    #[must_use]
    pub fn years(&self) -> f64 {
        years_between(self.start.fiscal_date_ending, self.end.fiscal_date_ending)
    }
}

/// Summary of a completed valuation.
#[derive(Clone, Debug, PartialEq)]
pub struct FairValueModel {
    /// Growth window used for the CAGR.
    pub endpoints: GrowthEndpoints,
    /// Length of the growth window in years.
    pub years: f64,
    /// Compound annual growth rate of EPS.
    pub cagr: f64,
    /// P/E multiple derived from the CAGR.
    pub fair_value_pe: f64,
    /// Projected fair value for each profitable year.
    pub points: Vec<FairValuePoint>,
}

/// Elapsed years between two dates, using [`DAYS_PER_YEAR`].
#[must_use]
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Selects the first profitable year and the most recent year.
///
/// Works on a sorted copy; the caller's ordering is left alone.
///
/// # Errors
/// - [`ValuationError::InsufficientData`] with fewer than [`MIN_EARNINGS_RECORDS`] records
/// - [`ValuationError::NoProfitableStart`] if no year reports positive EPS
/// - [`ValuationError::NonPositiveEndingEps`] if the most recent year is a loss
pub fn profitable_endpoints(
    earnings: &[AnnualEarningPoint],
) -> Result<GrowthEndpoints, ValuationError> {
    if earnings.len() < MIN_EARNINGS_RECORDS {
        return Err(ValuationError::InsufficientData {
            required: MIN_EARNINGS_RECORDS,
            found: earnings.len(),
        });
    }

    let mut sorted = earnings.to_vec();
    sorted.sort_by_key(|e| e.fiscal_date_ending);

    let start = sorted
        .iter()
        .find(|e| e.is_profitable())
        .cloned()
        .ok_or(ValuationError::NoProfitableStart)?;

    // Non-empty: length checked above.
    let end = sorted[sorted.len() - 1].clone();
    if !end.is_profitable() {
        return Err(ValuationError::NonPositiveEndingEps {
            eps: end.reported_eps,
        });
    }

    Ok(GrowthEndpoints { start, end })
}

/// Compound annual growth rate between two endpoints.
///
/// # Errors
/// Returns [`ValuationError::PeriodTooShort`] if the endpoints are less than a year apart.
pub fn cagr_between(endpoints: &GrowthEndpoints) -> Result<f64, ValuationError> {
    let years = endpoints.years();
    if years < 1.0 {
        return Err(ValuationError::PeriodTooShort { years });
    }

    let growth = endpoints.end.reported_eps / endpoints.start.reported_eps;
    Ok(growth.powf(1.0 / years) - 1.0)
}

/// Compound annual growth rate of EPS over the profitable part of the history.
///
/// # Errors
/// Propagates the errors of [`profitable_endpoints`] and [`cagr_between`].
pub fn cagr(earnings: &[AnnualEarningPoint]) -> Result<f64, ValuationError> {
    cagr_between(&profitable_endpoints(earnings)?)
}

/// Maps a growth rate to a P/E multiple. Negative growth gives a negative multiple.
#[must_use]
pub fn fair_value_pe(cagr: f64) -> f64 {
    cagr * 100.0
}

/// Projects a fair value price for every profitable year, in input order.
#[must_use]
pub fn fair_value_history(
    fair_value_pe: f64,
    earnings: &[AnnualEarningPoint],
) -> Vec<FairValuePoint> {
    earnings
        .iter()
        .filter(|e| e.is_profitable())
        .map(|e| FairValuePoint {
            symbol: e.symbol.clone(),
            date: e.fiscal_date_ending,
            fair_value_price: e.reported_eps * fair_value_pe,
        })
        .collect()
}

/// Runs the full valuation and keeps the intermediate figures.
///
/// # Errors
/// Propagates the errors of [`profitable_endpoints`] and [`cagr_between`].
pub fn valuate(earnings: &[AnnualEarningPoint]) -> Result<FairValueModel, ValuationError> {
    let endpoints = profitable_endpoints(earnings)?;
    let cagr = cagr_between(&endpoints)?;
    let pe = fair_value_pe(cagr);

    Ok(FairValueModel {
        years: endpoints.years(),
        endpoints,
        cagr,
        fair_value_pe: pe,
        points: fair_value_history(pe, earnings),
    })
}

/// Computes the fair value curve for an earnings history.
///
/// # Errors
/// Propagates the errors of [`profitable_endpoints`] and [`cagr_between`].
pub fn calculate_fair_value_history(
    earnings: &[AnnualEarningPoint],
) -> Result<Vec<FairValuePoint>, ValuationError> {
    valuate(earnings).map(|model| model.points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;
    use approx::assert_abs_diff_eq;

    fn earning(y: i32, m: u32, d: u32, eps: f64) -> AnnualEarningPoint {
        AnnualEarningPoint::new(
            Symbol::new("TEST"),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            eps,
        )
    }

    #[test]
    fn test_cagr_five_year_tenfold() {
        let earnings = vec![earning(2019, 1, 1, 1.0), earning(2024, 1, 1, 10.0)];

        let rate = cagr(&earnings).unwrap();
        let expected = 10f64.powf(1.0 / (1826.0 / 365.25)) - 1.0;
        assert_abs_diff_eq!(rate, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(rate, 0.5849, epsilon = 2e-4);

        let pe = fair_value_pe(rate);
        assert_abs_diff_eq!(pe, 58.49, epsilon = 2e-2);

        let history = fair_value_history(pe, &earnings[1..]);
        assert_abs_diff_eq!(history[0].fair_value_price, 584.9, epsilon = 0.2);
    }

    #[test]
    fn test_endpoints_skip_early_losses() {
        let earnings = vec![
            earning(2017, 12, 31, -2.0),
            earning(2018, 12, 31, 0.0),
            earning(2019, 12, 31, 0.5),
            earning(2020, 12, 31, -0.3),
            earning(2021, 12, 31, 1.2),
        ];

        let endpoints = profitable_endpoints(&earnings).unwrap();
        assert_eq!(endpoints.start, earnings[2]);
        assert_eq!(endpoints.end, earnings[4]);
    }

    #[test]
    fn test_endpoints_sort_a_copy() {
        let earnings = vec![
            earning(2023, 12, 31, 4.0),
            earning(2021, 12, 31, 2.0),
            earning(2022, 12, 31, 3.0),
        ];
        let before = earnings.clone();

        let endpoints = profitable_endpoints(&earnings).unwrap();

        assert_eq!(endpoints.start.reported_eps, 2.0);
        assert_eq!(endpoints.end.reported_eps, 4.0);
        assert_eq!(earnings, before);
    }

    #[test]
    fn test_insufficient_data() {
        let err = profitable_endpoints(&[earning(2024, 12, 31, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            ValuationError::InsufficientData {
                required: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_no_profitable_start() {
        let earnings = vec![earning(2022, 12, 31, -1.0), earning(2023, 12, 31, 0.0)];
        assert_eq!(
            profitable_endpoints(&earnings).unwrap_err(),
            ValuationError::NoProfitableStart
        );
    }

    #[test]
    fn test_ending_loss_rejected() {
        let earnings = vec![earning(2022, 12, 31, 1.0), earning(2023, 12, 31, -0.5)];
        assert_eq!(
            profitable_endpoints(&earnings).unwrap_err(),
            ValuationError::NonPositiveEndingEps { eps: -0.5 }
        );
    }

    #[test]
    fn test_period_too_short() {
        let earnings = vec![earning(2023, 6, 30, 1.0), earning(2023, 12, 31, 2.0)];
        let err = cagr(&earnings).unwrap_err();
        assert!(matches!(err, ValuationError::PeriodTooShort { years } if years < 1.0));
    }

    #[test]
    fn test_shrinking_company_gets_negative_fair_values() {
        let earnings = vec![earning(2020, 12, 31, 4.0), earning(2022, 12, 31, 1.0)];
        let model = valuate(&earnings).unwrap();

        assert!(model.cagr < 0.0);
        assert!(model.fair_value_pe < 0.0);
        assert!(model.points.iter().all(|p| p.fair_value_price < 0.0));
    }

    #[test]
    fn test_history_skips_losses_and_keeps_order() {
        let earnings = vec![
            earning(2024, 12, 31, 3.0),
            earning(2023, 12, 31, -1.0),
            earning(2022, 12, 31, 2.0),
        ];

        let history = fair_value_history(10.0, &earnings);

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, earnings[0].fiscal_date_ending);
        assert_eq!(history[0].fair_value_price, 30.0);
        assert_eq!(history[1].date, earnings[2].fiscal_date_ending);
        assert_eq!(history[1].fair_value_price, 20.0);
    }

    #[test]
    fn test_calculate_fair_value_history_one_year_doubling() {
        let earnings = vec![earning(2024, 12, 31, 10.0), earning(2023, 12, 31, 5.0)];

        let history = calculate_fair_value_history(&earnings).unwrap();

        assert_eq!(history.len(), 2);
        assert_abs_diff_eq!(history[0].fair_value_price, 997.1612494011704, epsilon = 1e-9);
        assert_abs_diff_eq!(history[1].fair_value_price, 498.5806247005852, epsilon = 1e-9);
    }

    #[test]
    fn test_valuate_reports_window() {
        let earnings = vec![earning(2019, 1, 1, 1.0), earning(2024, 1, 1, 10.0)];
        let model = valuate(&earnings).unwrap();

        assert_abs_diff_eq!(model.years, 1826.0 / 365.25, epsilon = 1e-12);
        assert_eq!(model.endpoints.start.reported_eps, 1.0);
        assert_eq!(model.points.len(), 2);
    }
}
