//! Alpha Vantage payload parsing.
//!
//! Tied to the response layout of the `TIME_SERIES_DAILY`, `EARNINGS` and `SPLITS`
//! functions. Alpha Vantage encodes numbers as strings, so every numeric field is
//! parsed by hand and bad records are either skipped or reported.

use std::collections::HashMap;

use chrono::NaiveDate;
use fairvalue_core::{
    AnnualEarningPoint, DATE_FORMAT, DailyPricePoint, DataError, PayloadParser, Result,
    StockSplitEvent, Symbol,
};
use serde::Deserialize;
use tracing::{debug, warn};

/// Parser for Alpha Vantage JSON payloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphaVantageParser;

impl PayloadParser for AlphaVantageParser {
    fn parse_daily_prices(
        &self,
        payload: &[u8],
        skip_errors: bool,
    ) -> Result<Vec<DailyPricePoint>> {
        let response: DailyPricesResponse = serde_json::from_slice(payload)
            .map_err(|e| DataError::Parse(format!("error unmarshaling daily prices: {e}")))?;

        let symbol = require_symbol(&response.meta_data.symbol, "daily prices")?;
        let mut records = Vec::with_capacity(response.time_series.len());

        for (raw_date, point) in &response.time_series {
            let parsed = parse_date(raw_date).and_then(|date| {
                parse_number(&point.close, "close price", raw_date).map(|close| (date, close))
            });

            match parsed {
                Ok((date, close)) => {
                    records.push(DailyPricePoint::new(symbol.clone(), date, close));
                }
                Err(e) if skip_errors => {
                    warn!(symbol = %symbol, date = %raw_date, error = %e, "Skipping daily price");
                }
                Err(e) => return Err(e),
            }
        }

        // JSON objects are unordered; restore newest-first order.
        records.sort_by(|a, b| b.date.cmp(&a.date));

        debug!(symbol = %symbol, count = records.len(), "Parsed daily prices");
        Ok(records)
    }

    fn parse_annual_earnings(
        &self,
        payload: &[u8],
        skip_errors: bool,
    ) -> Result<Vec<AnnualEarningPoint>> {
        let response: AnnualEarningsResponse = serde_json::from_slice(payload)
            .map_err(|e| DataError::Parse(format!("error unmarshaling annual earnings: {e}")))?;

        let symbol = require_symbol(&response.symbol, "annual earnings")?;
        let mut records = Vec::with_capacity(response.annual_earnings.len());

        for earning in &response.annual_earnings {
            let raw_date = &earning.fiscal_date_ending;
            let parsed = parse_date(raw_date).and_then(|date| {
                parse_number(&earning.reported_eps, "reported EPS", raw_date)
                    .map(|eps| (date, eps))
            });

            match parsed {
                Ok((date, eps)) => {
                    records.push(AnnualEarningPoint::new(symbol.clone(), date, eps));
                }
                Err(e) if skip_errors => {
                    warn!(symbol = %symbol, date = %raw_date, error = %e, "Skipping annual earning");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(symbol = %symbol, count = records.len(), "Parsed annual earnings");
        Ok(records)
    }

    fn parse_stock_splits(&self, payload: &[u8]) -> Result<Vec<StockSplitEvent>> {
        let response: StockSplitsResponse = serde_json::from_slice(payload)
            .map_err(|e| DataError::Parse(format!("error unmarshaling stock splits: {e}")))?;

        let symbol = require_symbol(&response.symbol, "stock splits")?;
        let mut records = Vec::with_capacity(response.data.len());

        for split in &response.data {
            let raw_date = &split.effective_date;
            let parsed = parse_date(raw_date)
                .and_then(|date| {
                    parse_number(&split.split_factor, "split factor", raw_date)
                        .map(|factor| (date, factor))
                })
                .and_then(|(date, factor)| {
                    if factor > 0.0 {
                        Ok((date, factor))
                    } else {
                        Err(DataError::Parse(format!(
                            "split factor must be positive, got {factor} for date {raw_date}"
                        )))
                    }
                });

            match parsed {
                Ok((date, factor)) => {
                    records.push(StockSplitEvent::new(symbol.clone(), date, factor));
                }
                Err(e) => {
                    warn!(symbol = %symbol, date = %raw_date, error = %e, "Skipping stock split");
                }
            }
        }

        debug!(symbol = %symbol, count = records.len(), "Parsed stock splits");
        Ok(records)
    }
}

fn require_symbol(raw: &str, what: &str) -> Result<Symbol> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DataError::Parse(format!(
            "ticker not found in JSON when parsing {what}"
        )));
    }
    Ok(Symbol::new(raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DataError::Parse(format!("could not parse date '{raw}': {e}")))
}

fn parse_number(raw: &str, field: &str, date: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|e| {
        DataError::Parse(format!("could not parse {field} '{raw}' for date {date}: {e}"))
    })
}

// ============================================================================
// Alpha Vantage API Response Types
// ============================================================================

/// `TIME_SERIES_DAILY` response.
#[derive(Debug, Deserialize)]
struct DailyPricesResponse {
    #[serde(rename = "Meta Data")]
    meta_data: MetaData,
    #[serde(rename = "Time Series (Daily)", default)]
    time_series: HashMap<String, DailyDataPoint>,
}

#[derive(Debug, Deserialize)]
struct MetaData {
    #[serde(rename = "2. Symbol", default)]
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct DailyDataPoint {
    #[serde(rename = "4. close", default)]
    close: String,
}

/// `EARNINGS` response. Quarterly earnings are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnualEarningsResponse {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    annual_earnings: Vec<AnnualEarning>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnualEarning {
    #[serde(default)]
    fiscal_date_ending: String,
    #[serde(rename = "reportedEPS", default)]
    reported_eps: String,
}

/// `SPLITS` response.
#[derive(Debug, Deserialize)]
struct StockSplitsResponse {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    data: Vec<SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    #[serde(default)]
    effective_date: String,
    #[serde(default)]
    split_factor: String,
}
