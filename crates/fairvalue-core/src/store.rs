//! Store trait for persisting combined price series.
//!
//! This module defines the [`CombinedSeriesStore`] trait that provides a unified
//! interface for writing the long-format series produced by a pipeline run and
//! reading it back for charting.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::{
    error::Result,
    types::{CombinedPoint, Symbol},
};

/// Outcome of a successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Absolute location of the written artifact.
    pub path: PathBuf,
    /// Human-readable summary of what was written.
    pub message: String,
}

/// Trait for persisting combined price series.
///
/// Implementations name artifacts deterministically from the symbol, so writing the
/// same symbol twice replaces the earlier artifact.
#[async_trait]
pub trait CombinedSeriesStore: Send + Sync {
    /// Writes all records for a symbol.
    async fn write(&self, symbol: &Symbol, records: &[CombinedPoint]) -> Result<WriteReceipt>;

    /// Reads the records previously written for a symbol.
    ///
    /// Returns `Ok(None)` if nothing has been written for the symbol.
    async fn read(&self, symbol: &Symbol) -> Result<Option<Vec<CombinedPoint>>>;
}
