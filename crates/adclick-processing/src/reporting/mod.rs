//! Dataset reporting.
//!
//! [`summarize`] logs row count, column names, label distribution and
//! descriptive statistics for the configured numeric columns. The same data
//! is available as a [`DatasetSummary`] through [`DatasetReporter::describe`]
//! and can be written to disk with [`ReportWriter`].

mod statistics;
mod summary;
mod writer;

pub use statistics::{ColumnStatistics, mean, quantile_sorted, sample_std};
pub use summary::{DatasetReporter, DatasetSummary, summarize};
pub use writer::ReportWriter;
