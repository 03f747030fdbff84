//! Shared helpers for pulling typed values out of a [`DataFrame`].
//!
//! Both the reporter and the preprocessor read numeric columns and the
//! binary label through these functions so that schema problems are
//! reported the same way everywhere.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType can be used as a feature (numeric or boolean).
#[inline]
pub fn is_feature_dtype(dtype: &DataType) -> bool {
    is_numeric_dtype(dtype) || matches!(dtype, DataType::Boolean)
}

/// Ensure every named column exists in the frame.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<()> {
    for name in columns {
        let name = name.as_ref();
        if df.column(name).is_err() {
            return Err(ProcessingError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}

/// Read a numeric column as `f64` values.
///
/// Fails with a schema mismatch if the column is not numeric or contains nulls.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))?;

    if !is_feature_dtype(column.dtype()) {
        return Err(ProcessingError::schema(
            name,
            format!("expected a numeric column, found {}", column.dtype()),
        ));
    }

    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    let values = series.f64()?;

    if values.null_count() > 0 {
        return Err(ProcessingError::schema(
            name,
            format!("{} missing values", values.null_count()),
        ));
    }

    Ok(values.into_iter().flatten().collect())
}

/// Read the label column as binary class labels (0 or 1).
pub fn binary_labels(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let raw = numeric_values(df, name)?;
    raw.into_iter()
        .map(|value| {
            if value == 0.0 {
                Ok(0)
            } else if value == 1.0 {
                Ok(1)
            } else {
                Err(ProcessingError::schema(
                    name,
                    format!("label must be 0 or 1, found {value}"),
                ))
            }
        })
        .collect()
}

/// Names of all columns, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}
