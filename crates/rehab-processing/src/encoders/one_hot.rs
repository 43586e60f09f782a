//! One-hot encoding of flat categorical columns.

use super::Vocabulary;
use crate::error::{PipelineError, Result};
use crate::utils::{require_column, string_values};
use polars::prelude::*;
use std::collections::BTreeSet;

/// One indicator column per distinct value.
pub struct OneHotEncoder;

impl OneHotEncoder {
    /// Collect the sorted distinct values of a column.
    ///
    /// The column must be complete: a null fails with
    /// [`PipelineError::MissingValues`].
    pub fn fit(df: &DataFrame, col_name: &str) -> Result<Vocabulary> {
        let values = Self::complete_values(df, col_name)?;
        let categories: BTreeSet<String> = values.into_iter().collect();

        Ok(Vocabulary {
            column: col_name.to_string(),
            categories: categories.into_iter().collect(),
        })
    }

    /// Build the indicator block for a fitted vocabulary.
    ///
    /// Values missing from the vocabulary produce an all-zero row.
    pub fn transform(df: &DataFrame, vocab: &Vocabulary) -> Result<Vec<Column>> {
        let values = Self::complete_values(df, &vocab.column)?;

        Ok(vocab
            .categories
            .iter()
            .map(|category| {
                let flags: Vec<u8> = values.iter().map(|v| u8::from(v == category)).collect();
                Column::from(Series::new(vocab.indicator_name(category).into(), flags))
            })
            .collect())
    }

    fn complete_values(df: &DataFrame, col_name: &str) -> Result<Vec<String>> {
        let series = require_column(df, col_name)?;
        let missing = series.null_count();
        if missing > 0 {
            return Err(PipelineError::MissingValues {
                column: col_name.to_string(),
                count: missing,
            });
        }
        Ok(string_values(series)?.into_iter().flatten().collect())
    }
}
