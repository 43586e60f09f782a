//! Statistical imputation methods.
//!
//! Provides median, mode and constant fills. Fitting and filling are kept
//! apart so that fill values learned on one table can be replayed on another.

use crate::error::{PipelineError, Result};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, float_series, require_column, string_mode,
    string_values,
};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Median of the non-null values of a numeric column.
    pub fn fit_median(df: &DataFrame, col_name: &str) -> Result<f64> {
        let series = require_column(df, col_name)?;
        float_series(series)?
            .median()
            .ok_or_else(|| PipelineError::NoValidValues(col_name.to_string()))
    }

    /// Most frequent non-null value of a categorical column.
    pub fn fit_mode(df: &DataFrame, col_name: &str) -> Result<String> {
        let series = require_column(df, col_name)?;
        string_mode(&string_values(series)?)
            .ok_or_else(|| PipelineError::NoValidValues(col_name.to_string()))
    }

    /// Fill nulls of a numeric column, casting it to `Float64`.
    ///
    /// Returns the number of cells filled.
    pub fn fill_numeric(df: &mut DataFrame, col_name: &str, fill_value: f64) -> Result<usize> {
        let series = require_column(df, col_name)?;
        let missing = series.null_count();
        let filled = fill_numeric_nulls(series, fill_value)?;
        df.replace(col_name, filled)?;

        debug!(
            "Filled {} nulls in '{}' with median: {:.2}",
            missing, col_name, fill_value
        );
        Ok(missing)
    }

    /// Fill nulls of a text column with a constant, casting it to `String`.
    ///
    /// Returns the number of cells filled.
    pub fn fill_constant(df: &mut DataFrame, col_name: &str, fill_value: &str) -> Result<usize> {
        let series = require_column(df, col_name)?;
        let missing = series.null_count();
        let filled = fill_string_nulls(series, fill_value)?;
        df.replace(col_name, filled)?;

        debug!(
            "Filled {} nulls in '{}' with '{}'",
            missing, col_name, fill_value
        );
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // fit_median() tests
    // ========================================================================

    #[test]
    fn test_fit_median_basic() {
        let df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();

        // Median of [1, 3, 5] = 3
        assert_eq!(StatisticalImputer::fit_median(&df, "values").unwrap(), 3.0);
    }

    #[test]
    fn test_fit_median_integer_column() {
        let df = df![
            "values" => [Some(10i64), Some(20), None],
        ]
        .unwrap();
        assert_eq!(StatisticalImputer::fit_median(&df, "values").unwrap(), 15.0);
    }

    #[test]
    fn test_fit_median_all_nulls() {
        let df = df![
            "values" => [Option::<f64>::None, None, None],
        ]
        .unwrap();

        let err = StatisticalImputer::fit_median(&df, "values").unwrap_err();
        assert!(matches!(err, PipelineError::NoValidValues(col) if col == "values"));
    }

    #[test]
    fn test_fit_median_nonexistent_column() {
        let df = df![
            "other" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let err = StatisticalImputer::fit_median(&df, "values").unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound(_)));
    }

    #[test]
    fn test_fit_median_text_column_is_schema_error() {
        let df = df![
            "values" => ["old", "young"],
        ]
        .unwrap();

        let err = StatisticalImputer::fit_median(&df, "values").unwrap_err();
        assert!(matches!(err, PipelineError::UnexpectedColumnType { .. }));
    }

    // ========================================================================
    // fit_mode() tests
    // ========================================================================

    #[test]
    fn test_fit_mode_basic() {
        let df = df![
            "category" => [Some("A"), Some("B"), Some("A"), None, Some("A")],
        ]
        .unwrap();
        assert_eq!(StatisticalImputer::fit_mode(&df, "category").unwrap(), "A");
    }

    #[test]
    fn test_fit_mode_tie_breaking() {
        let df = df![
            "category" => [Some("B"), Some("A"), None],
        ]
        .unwrap();

        // Tied counts resolve to the smallest value
        assert_eq!(StatisticalImputer::fit_mode(&df, "category").unwrap(), "A");
    }

    #[test]
    fn test_fit_mode_all_nulls() {
        let df = df![
            "category" => [Option::<&str>::None, None],
        ]
        .unwrap();
        assert!(StatisticalImputer::fit_mode(&df, "category").is_err());
    }

    // ========================================================================
    // fill_*() tests
    // ========================================================================

    #[test]
    fn test_fill_numeric_preserves_values() {
        let mut df = df![
            "values" => [Some(10i64), None, Some(20)],
        ]
        .unwrap();

        let filled = StatisticalImputer::fill_numeric(&mut df, "values", 15.0).unwrap();
        assert_eq!(filled, 1);

        let values = df.column("values").unwrap();
        assert!(matches!(values.dtype(), DataType::Float64));
        assert_eq!(values.null_count(), 0);
        assert_eq!(values.get(0).unwrap().try_extract::<f64>().unwrap(), 10.0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 15.0);
    }

    #[test]
    fn test_fill_constant_empty_marker() {
        let mut df = df![
            "Alerji" => [Some("Polen"), None, None],
        ]
        .unwrap();

        let filled = StatisticalImputer::fill_constant(&mut df, "Alerji", "").unwrap();
        assert_eq!(filled, 2);

        let values: Vec<Option<&str>> = df
            .column("Alerji")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("Polen"), Some(""), Some("")]);
    }
}
