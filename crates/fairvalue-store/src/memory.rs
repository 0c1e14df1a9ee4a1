//! In-memory store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fairvalue_core::{CombinedPoint, CombinedSeriesStore, Result, Symbol, WriteReceipt};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Stored series with the time it was written.
#[derive(Debug, Clone)]
struct StoreEntry {
    records: Vec<CombinedPoint>,
    written_at: DateTime<Utc>,
}

/// Simple in-memory store for testing and previews.
///
/// Series are kept in a `RwLock`-protected `HashMap` keyed by symbol and are lost
/// when the store is dropped. Records are cloned on read and write.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    series: RwLock<HashMap<Symbol, StoreEntry>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of symbols written so far.
    pub async fn len(&self) -> usize {
        self.series.read().await.len()
    }

    /// Returns true if nothing has been written.
    pub async fn is_empty(&self) -> bool {
        self.series.read().await.is_empty()
    }

    /// When the series for a symbol was last written.
    pub async fn written_at(&self, symbol: &Symbol) -> Option<DateTime<Utc>> {
        self.series
            .read()
            .await
            .get(symbol)
            .map(|entry| entry.written_at)
    }
}

#[async_trait]
impl CombinedSeriesStore for InMemoryStore {
    #[instrument(skip(self, records), fields(symbol = %symbol))]
    async fn write(&self, symbol: &Symbol, records: &[CombinedPoint]) -> Result<WriteReceipt> {
        let entry = StoreEntry {
            records: records.to_vec(),
            written_at: Utc::now(),
        };

        self.series.write().await.insert(symbol.clone(), entry);
        debug!("Stored {} combined rows", records.len());

        Ok(WriteReceipt {
            path: PathBuf::from(format!("memory://{symbol}")),
            message: format!(
                "Successfully stored {} combined records in memory",
                records.len()
            ),
        })
    }

    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn read(&self, symbol: &Symbol) -> Result<Option<Vec<CombinedPoint>>> {
        let store = self.series.read().await;
        match store.get(symbol) {
            Some(entry) => {
                debug!("Store hit");
                Ok(Some(entry.records.clone()))
            }
            None => {
                debug!("Store miss");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fairvalue_core::Series;

    fn point(price: f64) -> CombinedPoint {
        CombinedPoint {
            symbol: Symbol::new("AAPL"),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            price,
            series: Series::DailyPrice,
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = InMemoryStore::new();
        let symbol = Symbol::new("AAPL");

        assert!(store.read(&symbol).await.unwrap().is_none());
        assert!(store.is_empty().await);

        let receipt = store.write(&symbol, &[point(150.0)]).await.unwrap();
        assert_eq!(
            receipt.message,
            "Successfully stored 1 combined records in memory"
        );

        let read = store.read(&symbol).await.unwrap().unwrap();
        assert_eq!(read, vec![point(150.0)]);
        assert!(store.written_at(&symbol).await.is_some());
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = InMemoryStore::new();
        let symbol = Symbol::new("AAPL");

        store.write(&symbol, &[point(1.0)]).await.unwrap();
        store.write(&symbol, &[point(2.0), point(3.0)]).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.read(&symbol).await.unwrap().unwrap().len(), 2);
    }
}
