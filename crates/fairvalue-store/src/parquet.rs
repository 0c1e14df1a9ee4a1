//! Parquet-based store implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use fairvalue_core::{
    CombinedPoint, CombinedSeriesStore, DATE_FORMAT, DataError, Result, Series, Symbol,
    WriteReceipt,
};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Days from 0001-01-01 (CE) to 1970-01-01, the epoch of Polars `Date` values.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parquet file store for combined series.
///
/// Each symbol is written to `<dir>/<SYMBOL>.parquet` with columns
/// `ticker`, `date`, `price` and `series`. Writing a symbol again replaces its file.
/// Blocking file IO runs on `tokio::task::spawn_blocking`.
#[derive(Clone, Debug)]
pub struct ParquetStore {
    dir: PathBuf,
}

impl Default for ParquetStore {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ParquetStore {
    /// Create a store that writes into `dir`, creating it on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the file for a symbol.
    #[must_use]
    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{symbol}.parquet"))
    }

    /// Write records to a Parquet file, returning the number of rows written.
    ///
    /// # Errors
    /// Returns [`DataError::Persist`] if the frame cannot be built or the file cannot be written.
    pub fn write_file(path: &Path, records: &[CombinedPoint]) -> Result<usize> {
        let mut df = to_frame(records).map_err(|e| DataError::Persist(e.to_string()))?;

        let mut file = File::create(path)
            .map_err(|e| DataError::Persist(format!("failed to create '{}': {e}", path.display())))?;
        ParquetWriter::new(&mut file)
            .finish(&mut df)
            .map_err(|e| DataError::Persist(format!("failed to write parquet data: {e}")))?;

        Ok(df.height())
    }

    /// Read records back from a Parquet file written by [`ParquetStore::write_file`].
    ///
    /// # Errors
    /// Returns [`DataError::Persist`] if the file cannot be read, or
    /// [`DataError::Parse`] if a row is malformed.
    pub fn read_file(path: &Path) -> Result<Vec<CombinedPoint>> {
        let file = File::open(path)
            .map_err(|e| DataError::Persist(format!("failed to open '{}': {e}", path.display())))?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| DataError::Persist(format!("failed to read parquet data: {e}")))?;

        from_frame(&df)
    }
}

#[async_trait]
impl CombinedSeriesStore for ParquetStore {
    #[instrument(skip(self, records), fields(symbol = %symbol, count = records.len()))]
    async fn write(&self, symbol: &Symbol, records: &[CombinedPoint]) -> Result<WriteReceipt> {
        let dir = self.dir.clone();
        let path = self.path_for(symbol);
        let records = records.to_vec();

        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&dir).map_err(|e| {
                DataError::Persist(format!("failed to create '{}': {e}", dir.display()))
            })?;

            let written = Self::write_file(&path, &records)?;
            let path = path.canonicalize().map_err(|e| {
                DataError::Persist(format!(
                    "failed to get absolute path for '{}': {e}",
                    path.display()
                ))
            })?;

            debug!("Wrote {} combined rows to {}", written, path.display());
            Ok(WriteReceipt {
                path,
                message: format!(
                    "Successfully wrote {written} combined records to Parquet file"
                ),
            })
        })
        .await
        .map_err(|e| DataError::Persist(e.to_string()))?
    }

    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn read(&self, symbol: &Symbol) -> Result<Option<Vec<CombinedPoint>>> {
        let path = self.path_for(symbol);

        tokio::task::spawn_blocking(move || {
            if !path.exists() {
                debug!("No parquet file for symbol");
                return Ok(None);
            }
            Self::read_file(&path).map(Some)
        })
        .await
        .map_err(|e| DataError::Persist(e.to_string()))?
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Build the long-format frame written to disk.
fn to_frame(records: &[CombinedPoint]) -> PolarsResult<DataFrame> {
    let tickers: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
    let dates: Vec<i32> = records.iter().map(|r| days_since_epoch(r.date)).collect();
    let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
    let series: Vec<&str> = records.iter().map(|r| r.series.as_str()).collect();

    DataFrame::new(vec![
        Column::new("ticker".into(), tickers),
        Column::new("date".into(), dates),
        Column::new("price".into(), prices),
        Column::new("series".into(), series),
    ])?
    .lazy()
    .with_column(col("date").cast(DataType::Date))
    .collect()
}

fn from_frame(df: &DataFrame) -> Result<Vec<CombinedPoint>> {
    let tickers = df
        .column("ticker")
        .map_err(|e| DataError::Persist(e.to_string()))?
        .str()
        .map_err(|e| DataError::Persist(e.to_string()))?;
    let dates = df
        .column("date")
        .map_err(|e| DataError::Persist(e.to_string()))?
        .cast(&DataType::String)
        .map_err(|e| DataError::Persist(e.to_string()))?;
    let dates = dates.str().map_err(|e| DataError::Persist(e.to_string()))?;
    let prices = df
        .column("price")
        .map_err(|e| DataError::Persist(e.to_string()))?
        .f64()
        .map_err(|e| DataError::Persist(e.to_string()))?;
    let series = df
        .column("series")
        .map_err(|e| DataError::Persist(e.to_string()))?
        .str()
        .map_err(|e| DataError::Persist(e.to_string()))?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let ticker = tickers
            .get(i)
            .ok_or_else(|| DataError::Parse(format!("Missing ticker in row {i}")))?;
        let date = dates
            .get(i)
            .ok_or_else(|| DataError::Parse(format!("Missing date in row {i}")))?;
        let price = prices
            .get(i)
            .ok_or_else(|| DataError::Parse(format!("Missing price in row {i}")))?;
        let tag = series
            .get(i)
            .ok_or_else(|| DataError::Parse(format!("Missing series in row {i}")))?;

        records.push(CombinedPoint {
            symbol: Symbol::new(ticker),
            date: NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|e| DataError::Parse(format!("Invalid date '{date}' in row {i}: {e}")))?,
            price,
            series: tag.parse::<Series>()?,
        });
    }

    Ok(records)
}
