//! Fair value pipeline orchestrating fetch, parse, adjust, filter, valuate and persist.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use fairvalue_core::{
    CombinedPoint, CombinedSeriesStore, DataError, PayloadParser, RawDataFetcher, Symbol,
    adjust_for_splits, combine, filter_annual_earnings_within_range,
    filter_daily_prices_within_range, valuate,
};

/// Individual records that fail to parse are dropped rather than failing the run.
const SKIP_RECORD_ERRORS: bool = true;

/// A pipeline stage that can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Fetching raw daily prices.
    FetchDailyPrices,
    /// Fetching raw annual earnings.
    FetchEarnings,
    /// Fetching raw stock splits.
    FetchSplits,
    /// Parsing daily prices.
    ParseDailyPrices,
    /// Parsing annual earnings.
    ParseEarnings,
    /// Parsing stock splits.
    ParseSplits,
    /// Restricting daily prices to the date window.
    FilterDailyPrices,
    /// Restricting annual earnings to the date window.
    FilterEarnings,
    /// Computing the fair value curve.
    Valuate,
    /// Writing the combined series.
    Persist,
}

/// Broad category of a [`PipelineStage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Retrieving raw payloads.
    Fetch,
    /// Turning payloads into records.
    Parse,
    /// Applying the date window.
    Filter,
    /// Deriving fair values.
    Valuation,
    /// Writing the result.
    Persist,
}

impl PipelineStage {
    /// Returns the category of this stage.
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::FetchDailyPrices | Self::FetchEarnings | Self::FetchSplits => {
                StageKind::Fetch
            }
            Self::ParseDailyPrices | Self::ParseEarnings | Self::ParseSplits => {
                StageKind::Parse
            }
            Self::FilterDailyPrices | Self::FilterEarnings => StageKind::Filter,
            Self::Valuate => StageKind::Valuation,
            Self::Persist => StageKind::Persist,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchDailyPrices => "daily prices fetch",
            Self::FetchEarnings => "annual earnings fetch",
            Self::FetchSplits => "stock splits fetch",
            Self::ParseDailyPrices => "daily prices parsing",
            Self::ParseEarnings => "annual earnings parsing",
            Self::ParseSplits => "stock splits parsing",
            Self::FilterDailyPrices => "daily prices date filter",
            Self::FilterEarnings => "annual earnings date filter",
            Self::Valuate => "fair value calculation",
            Self::Persist => "combined series write",
        };
        f.write_str(name)
    }
}

/// A pipeline run aborted at `stage`.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    /// The stage that failed.
    pub stage: PipelineStage,
    /// The underlying cause.
    pub source: DataError,
}

impl PipelineError {
    /// Returns the category of the failed stage.
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        self.stage.kind()
    }
}

trait StageResultExt<T> {
    fn at_stage(self, stage: PipelineStage) -> Result<T, PipelineError>;
}

impl<T, E: Into<DataError>> StageResultExt<T> for Result<T, E> {
    fn at_stage(self, stage: PipelineStage) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError {
            stage,
            source: e.into(),
        })
    }
}

/// Parameters of one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineInput {
    /// Symbol to value.
    pub symbol: Symbol,
    /// Inclusive `YYYY-MM-DD` lower bound; `None` or empty for the start of history.
    pub start_date: Option<String>,
    /// Inclusive `YYYY-MM-DD` upper bound; `None` or empty for the latest data.
    pub end_date: Option<String>,
}

impl PipelineInput {
    /// Creates an input covering the full history of a symbol.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            start_date: None,
            end_date: None,
        }
    }

    /// Sets the lower bound of the date window.
    #[must_use]
    pub fn with_start_date(mut self, start: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self
    }

    /// Sets the upper bound of the date window.
    #[must_use]
    pub fn with_end_date(mut self, end: impl Into<String>) -> Self {
        self.end_date = Some(end.into());
        self
    }

    fn window(&self) -> String {
        let bound = |b: &Option<String>, open: &'static str| {
            b.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(open)
                .to_string()
        };
        format!(
            "{} to {}",
            bound(&self.start_date, "start of history"),
            bound(&self.end_date, "latest")
        )
    }
}

/// Result of a successful pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOutput {
    /// Number of daily prices inside the date window.
    pub record_count: usize,
    /// Absolute location of the persisted series.
    pub file_path: PathBuf,
    /// The combined series, for in-memory charting.
    pub combined: Vec<CombinedPoint>,
    /// Human-readable account of the run, in order.
    pub logs: Vec<String>,
}

/// Runs the fair value pipeline for one symbol at a time.
///
/// Stages run strictly in sequence and the first failure aborts the run, so a
/// failed run never reaches the store.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use fairvalue::{AlphaVantageProvider, FairValuePipeline, ParquetStore, PipelineInput};
///
/// let pipeline = FairValuePipeline::with_alpha_vantage(
///     AlphaVantageProvider::new("your_api_key"),
///     Arc::new(ParquetStore::new("output")),
/// );
///
/// let output = pipeline
///     .run(&PipelineInput::new("IBM").with_start_date("2015-01-01"))
///     .await?;
/// println!("{} daily prices written to {}", output.record_count, output.file_path.display());
/// ```
#[derive(Clone)]
pub struct FairValuePipeline {
    fetcher: Arc<dyn RawDataFetcher>,
    parser: Arc<dyn PayloadParser>,
    store: Arc<dyn CombinedSeriesStore>,
}

impl fmt::Debug for FairValuePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FairValuePipeline")
            .field("fetcher", &self.fetcher.name())
            .field("parser", &self.parser)
            .field("store", &"configured")
            .finish()
    }
}

impl FairValuePipeline {
    /// Create a pipeline from its three collaborators.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn RawDataFetcher>,
        parser: Arc<dyn PayloadParser>,
        store: Arc<dyn CombinedSeriesStore>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            store,
        }
    }

    /// Create a pipeline backed by Alpha Vantage.
    #[cfg(feature = "alphavantage")]
    #[must_use]
    pub fn with_alpha_vantage(
        provider: fairvalue_alphavantage::AlphaVantageProvider,
        store: Arc<dyn CombinedSeriesStore>,
    ) -> Self {
        Self::new(
            Arc::new(provider),
            Arc::new(fairvalue_alphavantage::AlphaVantageParser),
            store,
        )
    }

    /// Run the pipeline for one symbol.
    ///
    /// # Errors
    /// Returns a [`PipelineError`] naming the first stage that failed.
    pub async fn run(&self, input: &PipelineInput) -> Result<PipelineOutput, PipelineError> {
        let symbol = &input.symbol;
        let mut logs = Vec::new();
        info!(
            symbol = %symbol,
            provider = self.fetcher.name(),
            "Starting fair value pipeline"
        );

        let daily_json = self
            .fetcher
            .fetch_daily_prices(symbol)
            .await
            .at_stage(PipelineStage::FetchDailyPrices)?;
        let earnings_json = self
            .fetcher
            .fetch_earnings(symbol)
            .await
            .at_stage(PipelineStage::FetchEarnings)?;
        let splits_json = self
            .fetcher
            .fetch_stock_splits(symbol)
            .await
            .at_stage(PipelineStage::FetchSplits)?;
        logs.push(format!(
            "Fetched daily prices, annual earnings and stock splits for {symbol} from {}",
            self.fetcher.name()
        ));

        let daily_prices = self
            .parser
            .parse_daily_prices(&daily_json, SKIP_RECORD_ERRORS)
            .at_stage(PipelineStage::ParseDailyPrices)?;
        let earnings = self
            .parser
            .parse_annual_earnings(&earnings_json, SKIP_RECORD_ERRORS)
            .at_stage(PipelineStage::ParseEarnings)?;
        let splits = self
            .parser
            .parse_stock_splits(&splits_json)
            .at_stage(PipelineStage::ParseSplits)?;
        debug!(
            symbol = %symbol,
            daily_prices = daily_prices.len(),
            earnings = earnings.len(),
            splits = splits.len(),
            "Parsed payloads"
        );
        logs.push(format!(
            "Parsed {} daily prices, {} annual earnings and {} stock splits",
            daily_prices.len(),
            earnings.len(),
            splits.len()
        ));

        let adjusted = adjust_for_splits(&daily_prices, &splits);
        if !splits.is_empty() {
            logs.push(format!(
                "Adjusted daily prices for {} stock splits",
                splits.len()
            ));
        }

        let start = input.start_date.as_deref();
        let end = input.end_date.as_deref();
        let daily_prices = filter_daily_prices_within_range(&adjusted, start, end)
            .at_stage(PipelineStage::FilterDailyPrices)?;
        let earnings = filter_annual_earnings_within_range(&earnings, start, end)
            .at_stage(PipelineStage::FilterEarnings)?;
        debug!(
            symbol = %symbol,
            daily_prices = daily_prices.len(),
            earnings = earnings.len(),
            "Applied date window"
        );
        logs.push(format!(
            "Kept {} daily prices and {} annual earnings from {}",
            daily_prices.len(),
            earnings.len(),
            input.window()
        ));

        let model = valuate(&earnings).at_stage(PipelineStage::Valuate)?;
        debug!(
            cagr = model.cagr,
            fair_value_pe = model.fair_value_pe,
            years = model.years,
            "Valuation complete"
        );
        logs.push(format!(
            "EPS grew {:.2}% a year over {:.1} years ({} to {}), fair value P/E {:.2}",
            model.cagr * 100.0,
            model.years,
            model.endpoints.start.fiscal_date_ending,
            model.endpoints.end.fiscal_date_ending,
            model.fair_value_pe
        ));

        let combined = combine(&daily_prices, &model.points);
        let receipt = self
            .store
            .write(symbol, &combined)
            .await
            .at_stage(PipelineStage::Persist)?;
        logs.push(receipt.message);

        info!(
            symbol = %symbol,
            rows = combined.len(),
            path = %receipt.path.display(),
            "Fair value pipeline finished"
        );

        Ok(PipelineOutput {
            record_count: daily_prices.len(),
            file_path: receipt.path,
            combined,
            logs,
        })
    }
}

#[cfg(all(test, feature = "alphavantage"))]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use async_trait::async_trait;
    use fairvalue_alphavantage::AlphaVantageParser;
    use fairvalue_core::{DataProvider, Result, Series, WriteReceipt, split_series};
    use fairvalue_store::InMemoryStore;
    use std::sync::Mutex;

    const DAILY: &str = r#"{
        "Meta Data": {"2. Symbol": "TEST"},
        "Time Series (Daily)": {"2025-01-01": {"4. close": "150.00"}}
    }"#;

    const EARNINGS: &str = r#"{
        "symbol": "TEST",
        "annualEarnings": [
            {"fiscalDateEnding": "2024-12-31", "reportedEPS": "10.00"},
            {"fiscalDateEnding": "2023-12-31", "reportedEPS": "5.00"}
        ]
    }"#;

    const NO_SPLITS: &str = r#"{"symbol": "TEST", "data": []}"#;

    #[derive(Debug)]
    struct MockFetcher {
        daily: &'static str,
        earnings: &'static str,
        splits: &'static str,
        fail_at: Option<PipelineStage>,
        calls: Mutex<Vec<PipelineStage>>,
    }

    impl MockFetcher {
        fn new(daily: &'static str, earnings: &'static str, splits: &'static str) -> Self {
            Self {
                daily,
                earnings,
                splits,
                fail_at: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_at(mut self, stage: PipelineStage) -> Self {
            self.fail_at = Some(stage);
            self
        }

        fn respond(&self, stage: PipelineStage, body: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(stage);
            if self.fail_at == Some(stage) {
                return Err(DataError::Network("mock API fetch error".to_string()));
            }
            Ok(body.as_bytes().to_vec())
        }

        fn calls(&self) -> Vec<PipelineStage> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DataProvider for MockFetcher {
        fn name(&self) -> &str {
            "Mock"
        }

        fn description(&self) -> &str {
            "Canned payloads"
        }
    }

    #[async_trait]
    impl RawDataFetcher for MockFetcher {
        async fn fetch_daily_prices(&self, _symbol: &Symbol) -> Result<Vec<u8>> {
            self.respond(PipelineStage::FetchDailyPrices, self.daily)
        }

        async fn fetch_earnings(&self, _symbol: &Symbol) -> Result<Vec<u8>> {
            self.respond(PipelineStage::FetchEarnings, self.earnings)
        }

        async fn fetch_stock_splits(&self, _symbol: &Symbol) -> Result<Vec<u8>> {
            self.respond(PipelineStage::FetchSplits, self.splits)
        }
    }

    #[derive(Debug, Default)]
    struct FailingStore {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl CombinedSeriesStore for FailingStore {
        async fn write(&self, _symbol: &Symbol, _records: &[CombinedPoint]) -> Result<WriteReceipt> {
            *self.calls.lock().unwrap() += 1;
            Err(DataError::Persist("mock write error".to_string()))
        }

        async fn read(&self, _symbol: &Symbol) -> Result<Option<Vec<CombinedPoint>>> {
            Ok(None)
        }
    }

    fn pipeline(
        fetcher: Arc<MockFetcher>,
        store: Arc<dyn CombinedSeriesStore>,
    ) -> FairValuePipeline {
        FairValuePipeline::new(fetcher, Arc::new(AlphaVantageParser), store)
    }

    #[tokio::test]
    async fn test_run_success() {
        let fetcher = Arc::new(MockFetcher::new(DAILY, EARNINGS, NO_SPLITS));
        let store = Arc::new(InMemoryStore::new());
        let output = pipeline(fetcher, store.clone())
            .run(&PipelineInput::new("TEST"))
            .await
            .unwrap();

        assert_eq!(output.record_count, 1);
        assert_eq!(output.file_path, PathBuf::from("memory://TEST"));
        assert_eq!(output.combined.len(), 3);

        let (daily, fair) = split_series(&output.combined);
        assert_eq!(daily[0].close, 150.0);
        assert_eq!(fair[0].date.to_string(), "2024-12-31");
        assert_abs_diff_eq!(fair[0].fair_value_price, 997.1612494011704, epsilon = 1e-9);
        assert_abs_diff_eq!(fair[1].fair_value_price, 498.5806247005852, epsilon = 1e-9);

        let stored = store.read(&Symbol::new("TEST")).await.unwrap().unwrap();
        assert_eq!(stored, output.combined);
        assert_eq!(
            output.logs.last().unwrap(),
            "Successfully stored 3 combined records in memory"
        );
    }

    #[tokio::test]
    async fn test_earnings_fetch_failure_never_writes() {
        let fetcher =
            Arc::new(MockFetcher::new(DAILY, EARNINGS, NO_SPLITS).failing_at(PipelineStage::FetchEarnings));
        let store = Arc::new(InMemoryStore::new());

        let err = pipeline(fetcher.clone(), store.clone())
            .run(&PipelineInput::new("TEST"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::FetchEarnings);
        assert_eq!(err.kind(), StageKind::Fetch);
        assert!(matches!(err.source, DataError::Network(_)));
        assert_eq!(
            fetcher.calls(),
            vec![PipelineStage::FetchDailyPrices, PipelineStage::FetchEarnings]
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let fetcher = Arc::new(MockFetcher::new(DAILY, EARNINGS, NO_SPLITS));
        let store = Arc::new(FailingStore::default());

        let err = pipeline(fetcher, store.clone())
            .run(&PipelineInput::new("TEST"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::Persist);
        assert_eq!(err.kind(), StageKind::Persist);
        assert_eq!(*store.calls.lock().unwrap(), 1);
        assert!(err.to_string().starts_with("combined series write failed"));
    }

    #[tokio::test]
    async fn test_parse_failure_names_stage() {
        let fetcher = Arc::new(MockFetcher::new(DAILY, r#"{"annualEarnings": []}"#, NO_SPLITS));
        let store = Arc::new(InMemoryStore::new());

        let err = pipeline(fetcher, store.clone())
            .run(&PipelineInput::new("TEST"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::ParseEarnings);
        assert_eq!(err.stage.kind(), StageKind::Parse);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_date_boundary() {
        let fetcher = Arc::new(MockFetcher::new(DAILY, EARNINGS, NO_SPLITS));
        let store = Arc::new(InMemoryStore::new());

        let err = pipeline(fetcher, store.clone())
            .run(&PipelineInput::new("TEST").with_start_date("01/01/2024"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::FilterDailyPrices);
        assert_eq!(err.kind(), StageKind::Filter);
        assert!(matches!(err.source, DataError::InvalidDateFormat { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_window_too_narrow_for_valuation() {
        let fetcher = Arc::new(MockFetcher::new(DAILY, EARNINGS, NO_SPLITS));
        let store = Arc::new(InMemoryStore::new());

        let err = pipeline(fetcher, store.clone())
            .run(&PipelineInput::new("TEST").with_start_date("2024-01-01"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, PipelineStage::Valuate);
        assert_eq!(err.kind(), StageKind::Valuation);
        assert!(err.to_string().contains("endpoint selection"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_splits_adjust_daily_prices() {
        const DAILY_WITH_SPLIT: &str = r#"{
            "Meta Data": {"2. Symbol": "TEST"},
            "Time Series (Daily)": {
                "2024-06-11": {"4. close": "120.00"},
                "2024-06-10": {"4. close": "121.00"},
                "2024-06-07": {"4. close": "1200.00"},
                "2023-12-29": {"4. close": "500.00"}
            }
        }"#;
        const SPLIT: &str = r#"{
            "symbol": "TEST",
            "data": [{"effective_date": "2024-06-10", "split_factor": "10.0"}]
        }"#;

        let fetcher = Arc::new(MockFetcher::new(DAILY_WITH_SPLIT, EARNINGS, SPLIT));
        let output = pipeline(fetcher, Arc::new(InMemoryStore::new()))
            .run(&PipelineInput::new("TEST"))
            .await
            .unwrap();

        let daily: Vec<f64> = output
            .combined
            .iter()
            .filter(|p| p.series == Series::DailyPrice)
            .map(|p| p.price)
            .collect();
        assert_eq!(daily.len(), 4);
        assert_abs_diff_eq!(daily[0], 120.0);
        // Prices on the effective date are already post-split.
        assert_abs_diff_eq!(daily[1], 121.0);
        assert_abs_diff_eq!(daily[2], 120.0);
        assert_abs_diff_eq!(daily[3], 50.0);
        assert!(
            output
                .logs
                .iter()
                .any(|l| l == "Adjusted daily prices for 1 stock splits")
        );
    }

    #[tokio::test]
    async fn test_date_window_limits_daily_prices() {
        const DAILY_TWO_YEARS: &str = r#"{
            "Meta Data": {"2. Symbol": "TEST"},
            "Time Series (Daily)": {
                "2025-01-02": {"4. close": "151.00"},
                "2025-01-01": {"4. close": "150.00"},
                "2022-06-01": {"4. close": "90.00"}
            }
        }"#;

        let fetcher = Arc::new(MockFetcher::new(DAILY_TWO_YEARS, EARNINGS, NO_SPLITS));
        let output = pipeline(fetcher, Arc::new(InMemoryStore::new()))
            .run(&PipelineInput::new("TEST").with_start_date("2023-01-01"))
            .await
            .unwrap();

        assert_eq!(output.record_count, 2);
        assert_eq!(output.combined.len(), 4);
        assert!(output.logs.iter().any(|l| l.contains("2023-01-01 to latest")));
    }

    #[cfg(feature = "parquet")]
    #[tokio::test]
    async fn test_run_writes_parquet_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::new(DAILY, EARNINGS, NO_SPLITS));
        let store = Arc::new(fairvalue_store::ParquetStore::new(dir.path()));

        let output = pipeline(fetcher, store)
            .run(&PipelineInput::new("test").with_end_date("2025-12-31"))
            .await
            .unwrap();

        assert!(output.file_path.is_absolute());
        assert!(output.file_path.ends_with("TEST.parquet"));
        let read = fairvalue_store::ParquetStore::read_file(&output.file_path).unwrap();
        assert_eq!(read, output.combined);
    }
}
