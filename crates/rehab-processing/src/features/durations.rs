//! Conversion of text-tagged durations ("10 seans", "20 Dakika") to integers.

use crate::error::{PipelineError, Result};
use crate::utils::{extract_first_integer, require_column, string_values};
use polars::prelude::*;
use tracing::debug;

pub struct DurationNormalizer;

impl DurationNormalizer {
    /// Replace each listed column with the first digit run of every cell, as `Int64`.
    ///
    /// Numeric columns pass through the same path, so `15` stays `15`. A
    /// null cell or a cell without digits fails with
    /// [`PipelineError::DigitExtractionFailed`].
    pub fn extract_durations(mut df: DataFrame, columns: &[&str]) -> Result<DataFrame> {
        for col_name in columns {
            let values = Self::extract_column(&df, col_name)?;
            df.replace(col_name, Series::new((*col_name).into(), values))?;
            debug!("Extracted integer durations from '{}'", col_name);
        }
        Ok(df)
    }

    fn extract_column(df: &DataFrame, col_name: &str) -> Result<Vec<i64>> {
        let cells = string_values(require_column(df, col_name)?)?;
        cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.as_deref()
                    .and_then(extract_first_integer)
                    .ok_or_else(|| PipelineError::DigitExtractionFailed {
                        column: col_name.to_string(),
                        row,
                        value: cell.clone().unwrap_or_else(|| "null".to_string()),
                    })
            })
            .collect()
    }
}
