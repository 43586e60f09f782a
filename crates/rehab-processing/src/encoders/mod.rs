//! Categorical encoding.
//!
//! Flat categorical columns are one-hot encoded and multi-valued columns are
//! multi-hot encoded. Both replace the original column with a block of
//! `UInt8` indicators named `<column>_<value>`, appended after the columns
//! that are not encoded.

mod multi_hot;
mod one_hot;

pub use multi_hot::MultiHotEncoder;
pub use one_hot::OneHotEncoder;

use crate::config::ColumnSchema;
use crate::error::{Result, ResultExt};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Sorted categories (or tokens) observed for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub column: String,
    pub categories: Vec<String>,
}

impl Vocabulary {
    pub fn indicator_name(&self, category: &str) -> String {
        format!("{}_{}", self.column, category)
    }
}

/// Vocabularies learned by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingParams {
    pub one_hot: Vec<Vocabulary>,
    pub multi_hot: Vec<Vocabulary>,
}

impl EncodingParams {
    /// Replace the encoded columns with their indicator blocks.
    pub fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let mut blocks: Vec<Column> = Vec::new();
        for vocab in &self.one_hot {
            blocks.extend(OneHotEncoder::transform(&df, vocab)?);
        }
        for vocab in &self.multi_hot {
            blocks.extend(MultiHotEncoder::transform(&df, vocab)?);
        }

        let mut df = df;
        for vocab in self.one_hot.iter().chain(&self.multi_hot) {
            df = df.drop(&vocab.column)?;
        }

        df.hstack(&blocks).context("Appending indicator columns")
    }

    /// Number of indicator columns per encoded column.
    pub fn indicator_counts(&self) -> BTreeMap<String, usize> {
        self.one_hot
            .iter()
            .chain(&self.multi_hot)
            .map(|v| (v.column.clone(), v.categories.len()))
            .collect()
    }
}

/// Fits vocabularies and encodes the configured columns.
pub struct Encoder;

impl Encoder {
    pub fn fit(df: &DataFrame, columns: &ColumnSchema) -> Result<EncodingParams> {
        let one_hot = columns
            .one_hot_columns()
            .into_iter()
            .map(|col| OneHotEncoder::fit(df, col))
            .collect::<Result<Vec<_>>>()?;

        let multi_hot = columns
            .multi_valued
            .iter()
            .map(|col| MultiHotEncoder::fit(df, col))
            .collect::<Result<Vec<_>>>()?;

        for vocab in one_hot.iter().chain(&multi_hot) {
            debug!(
                "'{}': {} categories",
                vocab.column,
                vocab.categories.len()
            );
        }

        Ok(EncodingParams { one_hot, multi_hot })
    }

    pub fn fit_transform(
        df: DataFrame,
        columns: &ColumnSchema,
    ) -> Result<(DataFrame, EncodingParams)> {
        let params = Self::fit(&df, columns)?;
        let before = df.width();
        let df = params.apply(df)?;
        info!("Encoding: {} columns -> {} columns", before, df.width());
        Ok((df, params))
    }
}
