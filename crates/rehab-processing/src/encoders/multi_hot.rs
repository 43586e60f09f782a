//! Multi-hot encoding of comma-separated multi-valued columns.

use super::Vocabulary;
use crate::error::Result;
use crate::utils::{require_column, split_tokens, string_values};
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// One indicator column per distinct token; several may be set per row.
pub struct MultiHotEncoder;

impl MultiHotEncoder {
    /// Collect the sorted distinct tokens of a column.
    ///
    /// Null and empty cells contribute no tokens.
    pub fn fit(df: &DataFrame, col_name: &str) -> Result<Vocabulary> {
        let cells = string_values(require_column(df, col_name)?)?;
        let tokens: BTreeSet<String> = cells
            .iter()
            .flatten()
            .flat_map(|cell| split_tokens(cell))
            .map(str::to_string)
            .collect();

        Ok(Vocabulary {
            column: col_name.to_string(),
            categories: tokens.into_iter().collect(),
        })
    }

    /// Build the indicator block for a fitted vocabulary.
    pub fn transform(df: &DataFrame, vocab: &Vocabulary) -> Result<Vec<Column>> {
        let cells = string_values(require_column(df, &vocab.column)?)?;
        let row_tokens: Vec<HashSet<&str>> = cells
            .iter()
            .map(|cell| {
                cell.as_deref()
                    .map(|c| split_tokens(c).into_iter().collect())
                    .unwrap_or_default()
            })
            .collect();

        Ok(vocab
            .categories
            .iter()
            .map(|token| {
                let flags: Vec<u8> = row_tokens
                    .iter()
                    .map(|set| u8::from(set.contains(token.as_str())))
                    .collect();
                Column::from(Series::new(vocab.indicator_name(token).into(), flags))
            })
            .collect())
    }
}
