//! Shared utilities for the rehabilitation records pipeline.
//!
//! Column access, text parsing and small statistics used by more than one
//! stage.

use crate::error::{PipelineError, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid regex: digit run"));

// =============================================================================
// Column Access
// =============================================================================

/// Look up a column, mapping a miss to [`PipelineError::ColumnNotFound`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))
}

/// Fail with [`PipelineError::ColumnNotFound`] for the first absent column.
pub fn ensure_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        require_column(df, name)?;
    }
    Ok(())
}

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

/// Cast a column to `Float64`.
///
/// Numeric columns are cast directly; text columns must parse as numbers
/// cell by cell or the call fails with
/// [`PipelineError::UnexpectedColumnType`].
pub fn float_series(series: &Series) -> Result<Series> {
    series
        .strict_cast(&DataType::Float64)
        .map_err(|_| PipelineError::UnexpectedColumnType {
            column: series.name().to_string(),
            expected: "numeric".to_string(),
            found: series.dtype().to_string(),
        })
}

/// Read a column as optional floats (see [`float_series`]).
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    Ok(float_series(series)?.f64()?.into_iter().collect())
}

/// Read a column as optional strings, whatever its dtype.
pub fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Text Parsing
// =============================================================================

/// Split a multi-valued cell into trimmed, non-empty tokens.
///
/// An empty (or all-whitespace) cell yields no tokens.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(split_tokens(" Diyabet, Hipertansiyon "), vec!["Diyabet", "Hipertansiyon"]);
/// assert!(split_tokens("").is_empty());
/// ```
pub fn split_tokens(cell: &str) -> Vec<&str> {
    cell.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Extract the first run of ASCII digits from a string as an integer.
///
/// Returns `None` when the string has no digits or the run overflows `i64`.
pub fn extract_first_integer(s: &str) -> Option<i64> {
    DIGIT_RUN
        .find(s)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent non-null value.
///
/// Ties go to the lexicographically smallest value.
pub fn string_mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, _)| val.to_string())
}

/// Count occurrences preserving first-appearance order, sorted by count desc.
pub fn ordered_value_counts<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> Result<Series> {
    let filled: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> Result<Series> {
    let filled: Vec<String> = string_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
