//! Numeric normalization and derived features.
//!
//! - [`DurationNormalizer`] turns the text-tagged duration columns into `Int64`
//! - [`FeatureEngineer`] adds the age group label and the
//!   application-per-session ratio

mod age_group;
mod durations;

pub use age_group::AgeGroup;
pub use durations::DurationNormalizer;

use crate::config::ColumnSchema;
use crate::error::Result;
use crate::utils::{numeric_values, require_column};
use polars::prelude::*;
use tracing::{info, warn};

/// Adds derived columns.
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Append the age group and the duration ratio.
    ///
    /// Returns the table and the warnings raised (ages with no bucket).
    pub fn add_features(
        mut df: DataFrame,
        columns: &ColumnSchema,
    ) -> Result<(DataFrame, Vec<String>)> {
        let mut warnings = Vec::new();

        let (groups, unbucketed) = Self::age_groups(&df, &columns.age, &columns.age_group)?;
        if unbucketed > 0 {
            let msg = format!(
                "{} rows have an age outside (0, 100] and no '{}' label",
                unbucketed, columns.age_group
            );
            warn!("{}", msg);
            warnings.push(msg);
        }
        df.with_column(groups)?;

        let (ratio, undefined) = Self::duration_ratio(
            &df,
            &columns.application_duration,
            &columns.treatment_duration,
            &columns.duration_ratio,
        )?;
        if undefined > 0 {
            let msg = format!(
                "{} rows have a zero '{}'; '{}' left empty",
                undefined, columns.treatment_duration, columns.duration_ratio
            );
            warn!("{}", msg);
            warnings.push(msg);
        }
        df.with_column(ratio)?;

        info!(
            "Added features '{}' and '{}'",
            columns.age_group, columns.duration_ratio
        );
        Ok((df, warnings))
    }

    /// Age group labels plus the number of non-null ages left unlabelled.
    pub fn age_groups(df: &DataFrame, age_col: &str, output: &str) -> Result<(Series, usize)> {
        let ages = numeric_values(require_column(df, age_col)?)?;
        let mut unbucketed = 0;
        let labels: Vec<Option<&str>> = ages
            .iter()
            .map(|age| {
                let group = age.and_then(AgeGroup::from_age);
                if age.is_some() && group.is_none() {
                    unbucketed += 1;
                }
                group.map(|g| g.label())
            })
            .collect();

        Ok((Series::new(output.into(), labels), unbucketed))
    }

    /// `numerator / denominator` as `Float64`, null where the denominator is 0.
    ///
    /// Also returns the number of rows where the ratio is undefined.
    pub fn duration_ratio(
        df: &DataFrame,
        numerator: &str,
        denominator: &str,
        output: &str,
    ) -> Result<(Series, usize)> {
        let num = numeric_values(require_column(df, numerator)?)?;
        let den = numeric_values(require_column(df, denominator)?)?;

        let mut undefined = 0;
        let ratio: Vec<Option<f64>> = num
            .iter()
            .zip(&den)
            .map(|(n, d)| match (n, d) {
                (Some(_), Some(d)) if *d == 0.0 => {
                    undefined += 1;
                    None
                }
                (Some(n), Some(d)) => Some(n / d),
                _ => None,
            })
            .collect();

        Ok((Series::new(output.into(), ratio), undefined))
    }
}
