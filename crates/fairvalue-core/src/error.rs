//! Error types for fair value operations.
//!
//! This module defines [`DataError`], which covers fetching, parsing, filtering and
//! persisting price data, and [`ValuationError`], which covers the preconditions of the
//! CAGR-based valuation.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, non-success responses, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// A payload was malformed or missing a required field.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A date boundary supplied by the caller is not a valid `YYYY-MM-DD` date.
    #[error("Invalid date format '{value}': {reason}")]
    InvalidDateFormat {
        /// The rejected input.
        value: String,
        /// Why the input was rejected.
        reason: String,
    },

    /// The valuation preconditions were not met.
    #[error("Valuation failed during {step}: {0}", step = .0.step())]
    Valuation(#[from] ValuationError),

    /// Writing or reading a persisted artifact failed.
    #[error("Persist error: {0}")]
    Persist(String),
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

/// The valuation sub-step an error originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValuationStep {
    /// Selecting the profitable start and end earnings records.
    EndpointSelection,
    /// Computing the compound annual growth rate.
    Cagr,
}

impl std::fmt::Display for ValuationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndpointSelection => write!(f, "endpoint selection"),
            Self::Cagr => write!(f, "CAGR"),
        }
    }
}

/// Errors raised when earnings history cannot support a CAGR valuation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// Fewer earnings records than the calculation needs.
    #[error("not enough data points: minimum {required}, found {found}")]
    InsufficientData {
        /// Minimum number of records.
        required: usize,
        /// Number of records supplied.
        found: usize,
    },

    /// No record reports a positive EPS, so there is no growth starting point.
    #[error("no valid starting point with positive EPS found")]
    NoProfitableStart,

    /// The most recent record reports a loss.
    #[error("ending EPS must be positive for a CAGR calculation, got {eps}")]
    NonPositiveEndingEps {
        /// The EPS of the chronologically last record.
        eps: f64,
    },

    /// Start and end are less than one year apart.
    #[error("period between start and end must be at least one year, got {years:.3} years")]
    PeriodTooShort {
        /// Elapsed years between the endpoints.
        years: f64,
    },
}

impl ValuationError {
    /// Returns the sub-step that produced this error.
    #[must_use]
    pub const fn step(&self) -> ValuationStep {
        match self {
            Self::InsufficientData { .. }
            | Self::NoProfitableStart
            | Self::NonPositiveEndingEps { .. } => ValuationStep::EndpointSelection,
            Self::PeriodTooShort { .. } => ValuationStep::Cagr,
        }
    }
}
