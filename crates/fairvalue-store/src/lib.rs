#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairvalue/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Store implementations for combined fair value series.
//!
//! This crate provides implementations of the [`CombinedSeriesStore`] trait from
//! `fairvalue-core`:
//!
//! - [`ParquetStore`] - One Parquet file per symbol (default, requires `parquet` feature)
//! - [`InMemoryStore`] - Simple in-memory store for testing

/// In-memory store implementation.
pub mod memory;

/// Parquet-based store implementation.
#[cfg(feature = "parquet")]
pub mod parquet;

// Re-export the trait for convenience
pub use fairvalue_core::CombinedSeriesStore;

// Re-export implementations
pub use memory::InMemoryStore;

#[cfg(feature = "parquet")]
pub use parquet::ParquetStore;
