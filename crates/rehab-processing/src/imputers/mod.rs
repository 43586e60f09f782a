//! Imputation module for handling missing values.
//!
//! Each column role gets one strategy:
//! - numeric: median of the observed values
//! - flat categorical: mode (ties go to the smallest value)
//! - multi-valued text: the empty marker, meaning "no tokens"
//!
//! [`Imputer::fit_transform`] learns the fill values and applies them;
//! the resulting [`ImputationParams`] replays the same fills on new data.

mod statistical;

pub use statistical::StatisticalImputer;

use crate::config::ColumnSchema;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Marker written into empty multi-valued cells.
pub const EMPTY_MARKER: &str = "";

/// Fill values learned from a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationParams {
    /// Median fill per numeric column.
    pub numeric: Vec<(String, f64)>,
    /// Mode fill per categorical column.
    pub categorical: Vec<(String, String)>,
    /// Multi-valued columns filled with [`EMPTY_MARKER`].
    pub multi_valued: Vec<String>,
}

impl ImputationParams {
    /// Apply the stored fills. Returns the table and cells filled per column.
    pub fn apply(&self, mut df: DataFrame) -> Result<(DataFrame, BTreeMap<String, usize>)> {
        let mut filled = BTreeMap::new();

        for (col, value) in &self.numeric {
            let n = StatisticalImputer::fill_numeric(&mut df, col, *value)?;
            filled.insert(col.clone(), n);
        }
        for (col, value) in &self.categorical {
            let n = StatisticalImputer::fill_constant(&mut df, col, value)?;
            filled.insert(col.clone(), n);
        }
        for col in &self.multi_valued {
            let n = StatisticalImputer::fill_constant(&mut df, col, EMPTY_MARKER)?;
            filled.insert(col.clone(), n);
        }

        Ok((df, filled))
    }
}

/// Learns and applies fill values for the configured columns.
pub struct Imputer;

impl Imputer {
    /// Learn fill values from `df` and fill it.
    pub fn fit_transform(
        df: DataFrame,
        columns: &ColumnSchema,
    ) -> Result<(DataFrame, ImputationParams, BTreeMap<String, usize>)> {
        let params = Self::fit(&df, columns)?;
        let (df, filled) = params.apply(df)?;

        let total: usize = filled.values().sum();
        info!("Imputed {} missing values across {} columns", total, filled.len());
        Ok((df, params, filled))
    }

    /// Learn fill values without modifying the table.
    pub fn fit(df: &DataFrame, columns: &ColumnSchema) -> Result<ImputationParams> {
        let median = StatisticalImputer::fit_median(df, &columns.age)?;

        let categorical = columns
            .categorical
            .iter()
            .map(|col| Ok((col.clone(), StatisticalImputer::fit_mode(df, col)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(ImputationParams {
            numeric: vec![(columns.age.clone(), median)],
            categorical,
            multi_valued: columns.multi_valued.clone(),
        })
    }
}
