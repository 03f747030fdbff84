//! Dataset loading and preprocessing for the ad-click model pipeline.
//!
//! This crate covers the data half of the pipeline:
//!
//! - **Loading**: read the advertising table from the first existing path of
//!   an ordered candidate list ([`DataLoader`], [`load_data`])
//! - **Reporting**: log row count, columns, label balance and descriptive
//!   statistics ([`summarize`], [`DatasetReporter`])
//! - **Preprocessing**: seeded 70/30 train/test partition with min-max and
//!   standard scaling fitted on the train rows only ([`preprocess`])
//!
//! The resulting [`Split`] is consumed by the `adclick-learning` crate.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use adclick_processing::{PipelineConfig, load_data, preprocess, summarize};
//!
//! let config = PipelineConfig::builder()
//!     .candidate_paths(vec!["data/advertising.csv".into()])
//!     .build()?;
//!
//! let df = load_data(&config.candidate_paths)?;
//! summarize(&df, &config)?;
//! let split = preprocess(&df, &config)?;
//!
//! println!("{} train rows, {} test rows", split.n_train(), split.n_test());
//! ```
//!
//! # Errors
//!
//! Every operation returns [`ProcessingResult`]. A missing dataset is
//! [`ProcessingError::NotFound`] with every attempted path; missing or
//! malformed columns are schema mismatches.

pub mod config;
pub mod error;
pub mod loader;
pub mod preprocessing;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, EXCLUDED_COLUMNS, LABEL_COLUMN, PipelineConfig, PipelineConfigBuilder,
    SCALED_COLUMNS, SUMMARY_COLUMNS, default_candidate_paths,
};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use loader::{DataLoader, load_data};
pub use preprocessing::{FeatureScaler, MinMaxScaler, Preprocessor, StandardScaler, preprocess};
pub use reporting::{ColumnStatistics, DatasetReporter, DatasetSummary, ReportWriter, summarize};
pub use types::Split;

/// Re-exported so callers can build tables without a direct polars dependency.
pub use polars::prelude::DataFrame;
