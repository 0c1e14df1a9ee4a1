#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairvalue/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Earnings-based fair value curves for publicly traded stocks.
//!
//! This crate wires the `fairvalue-core` computations, a data provider and a
//! store into a [`FairValuePipeline`]. It re-exports core types and the
//! provider and store implementations.
//!
//! # Features
//!
//! - `alphavantage` - Alpha Vantage fetcher and parser
//! - `parquet` - Parquet file store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fairvalue::{AlphaVantageProvider, FairValuePipeline, ParquetStore, PipelineInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fairvalue::PipelineError> {
//!     let pipeline = FairValuePipeline::with_alpha_vantage(
//!         AlphaVantageProvider::new("your_api_key"),
//!         Arc::new(ParquetStore::new("output")),
//!     );
//!
//!     let output = pipeline.run(&PipelineInput::new("AAPL")).await?;
//!     for line in &output.logs {
//!         println!("{line}");
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use fairvalue_core::*;

// Store implementations
#[cfg(feature = "parquet")]
pub use fairvalue_store::ParquetStore;
pub use fairvalue_store::InMemoryStore;

// Providers
#[cfg(feature = "alphavantage")]
pub use fairvalue_alphavantage::{
    ALPHA_VANTAGE_BASE_URL, AlphaVantageParser, AlphaVantageProvider, MOCK_BASE_URL,
};

mod pipeline;
pub use pipeline::{
    FairValuePipeline, PipelineError, PipelineInput, PipelineOutput, PipelineStage, StageKind,
};
