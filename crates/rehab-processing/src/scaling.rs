//! Feature scaling.
//!
//! Each column is mapped with `(x - center) / scale`, where `center` and
//! `scale` are the min and range (minmax) or the mean and population standard
//! deviation (standard). Nulls are ignored when fitting and stay null.

use crate::config::ScalingMethod;
use crate::error::{PipelineError, Result};
use crate::utils::{float_series, numeric_values, require_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fitted parameters for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScaling {
    pub column: String,
    /// min (minmax) or mean (standard)
    pub center: f64,
    /// range (minmax) or population std (standard); 0 for a constant column
    pub scale: f64,
}

impl ColumnScaling {
    fn forward(&self, x: f64) -> f64 {
        if self.scale == 0.0 {
            0.0
        } else {
            (x - self.center) / self.scale
        }
    }

    fn inverse(&self, x: f64) -> f64 {
        x * self.scale + self.center
    }
}

/// A scaler fitted on a table, reusable on others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    pub method: ScalingMethod,
    pub params: Vec<ColumnScaling>,
}

impl FittedScaler {
    /// Fit on the given columns of `df`.
    pub fn fit(df: &DataFrame, columns: &[&str], method: ScalingMethod) -> Result<Self> {
        let params = columns
            .iter()
            .map(|col| Self::fit_column(df, col, method))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { method, params })
    }

    pub fn fit_transform(
        df: DataFrame,
        columns: &[&str],
        method: ScalingMethod,
    ) -> Result<(DataFrame, Self)> {
        let scaler = Self::fit(&df, columns, method)?;
        let df = scaler.transform(df)?;
        Ok((df, scaler))
    }

    /// Scale the fitted columns of `df`.
    pub fn transform(&self, df: DataFrame) -> Result<DataFrame> {
        self.map_columns(df, ColumnScaling::forward)
    }

    /// Undo [`FittedScaler::transform`].
    pub fn inverse_transform(&self, df: DataFrame) -> Result<DataFrame> {
        self.map_columns(df, ColumnScaling::inverse)
    }

    pub fn get(&self, column: &str) -> Option<&ColumnScaling> {
        self.params.iter().find(|p| p.column == column)
    }

    fn fit_column(df: &DataFrame, col_name: &str, method: ScalingMethod) -> Result<ColumnScaling> {
        let values = float_series(require_column(df, col_name)?)?;
        let no_values = || PipelineError::NoValidValues(col_name.to_string());

        let (center, scale) = match method {
            ScalingMethod::MinMax => {
                let min = values.min::<f64>()?.ok_or_else(no_values)?;
                let max = values.max::<f64>()?.ok_or_else(no_values)?;
                (min, max - min)
            }
            ScalingMethod::Standard => {
                let mean = values.mean().ok_or_else(no_values)?;
                let std = values.std(0).ok_or_else(no_values)?;
                (mean, std)
            }
        };

        debug!(
            "Scaling '{}' ({}): center={:.4}, scale={:.4}",
            col_name, method, center, scale
        );
        Ok(ColumnScaling {
            column: col_name.to_string(),
            center,
            scale,
        })
    }

    fn map_columns(&self, mut df: DataFrame, f: fn(&ColumnScaling, f64) -> f64) -> Result<DataFrame> {
        for param in &self.params {
            let values: Vec<Option<f64>> = numeric_values(require_column(&df, &param.column)?)?
                .into_iter()
                .map(|v| v.map(|x| f(param, x)))
                .collect();
            df.replace(&param.column, Series::new(param.column.as_str().into(), values))?;
        }
        Ok(df)
    }
}
