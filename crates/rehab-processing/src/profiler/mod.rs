//! Data profiling module for dataset analysis.
//!
//! This module provides read-only profiling of the record table:
//! - per-column dtype, missing counts, samples and descriptive statistics
//! - duplicate detection
//! - exploratory diagnostics (histograms, correlation, target distribution,
//!   top tokens of multi-valued columns)
//! - diagnostics over the final, transformed table

mod statistics;

use crate::cleaner::Deduplicator;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::AgeGroup;
use crate::types::{CategoryCounts, ColumnProfile, DatasetProfile, FinalDiagnostics, Histogram};
use crate::utils::{
    extract_first_integer, float_series, is_numeric_dtype, numeric_values, ordered_value_counts,
    split_tokens, string_values,
};
use polars::prelude::*;
use rand::prelude::*;
use tracing::debug;

use statistics::{correlation_matrix, describe_numeric, describe_text, histogram};

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile the raw table.
    ///
    /// Diagnostics whose source column is absent or unusable are left out
    /// rather than failing; schema problems surface in the stages that need
    /// the column.
    pub fn profile_dataset(df: &DataFrame, config: &PipelineConfig) -> Result<DatasetProfile> {
        let columns = &config.columns;

        let column_profiles = df
            .get_column_names()
            .into_iter()
            .map(|name| Self::profile_column(df, name))
            .collect::<Result<Vec<_>>>()?;

        let duplicate_count = Deduplicator::count_duplicates(df)?;
        let duplicate_percentage = if df.height() > 0 {
            (duplicate_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };

        let ages = Self::numeric_column(df, &columns.age);
        let age_histogram = ages.as_ref().and_then(|values| {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            histogram(&columns.age, &present, config.histogram_bins)
        });

        let durations = Self::leading_integers(df, &columns.treatment_duration);
        let treatment_duration_histogram = durations.as_ref().and_then(|values| {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            histogram(&columns.treatment_duration, &present, config.histogram_bins)
        });

        let application = Self::leading_integers(df, &columns.application_duration);
        let correlation = match (ages, application) {
            (Some(ages), Some(application)) => Some(correlation_matrix(&[
                (columns.age.clone(), ages),
                (columns.application_duration.clone(), application),
            ])),
            _ => None,
        };

        let target_distribution = Self::text_column(df, &columns.treatment_duration).map(|values| {
            CategoryCounts {
                title: columns.treatment_duration.clone(),
                counts: ordered_value_counts(values.iter().flatten().map(String::as_str)),
            }
        });

        let token_frequencies = columns
            .multi_valued
            .iter()
            .filter_map(|col| Self::top_tokens(df, col, config.top_tokens))
            .collect();

        debug!(
            "Profiled {} columns, {} duplicate rows",
            column_profiles.len(),
            duplicate_count
        );

        Ok(DatasetProfile {
            shape: (df.height(), df.width()),
            column_profiles,
            duplicate_count,
            duplicate_percentage,
            age_histogram,
            treatment_duration_histogram,
            correlation,
            target_distribution,
            token_frequencies,
        })
    }

    /// Diagnostics over the transformed table.
    pub fn profile_final(df: &DataFrame, config: &PipelineConfig) -> Result<FinalDiagnostics> {
        let columns = &config.columns;

        let numeric_histogram = |name: &str| -> Option<Histogram> {
            let values = Self::numeric_column(df, name)?;
            let present: Vec<f64> = values.into_iter().flatten().collect();
            histogram(name, &present, config.histogram_bins)
        };

        let labels = Self::text_column(df, &columns.age_group).unwrap_or_default();
        let counts = AgeGroup::ALL
            .iter()
            .map(|group| {
                let n = labels
                    .iter()
                    .filter(|l| l.as_deref() == Some(group.label()))
                    .count();
                (group.label().to_string(), n)
            })
            .collect();

        Ok(FinalDiagnostics {
            shape: (df.height(), df.width()),
            age_histogram: numeric_histogram(&columns.age),
            treatment_duration_histogram: numeric_histogram(&columns.treatment_duration),
            age_group_counts: CategoryCounts {
                title: columns.age_group.clone(),
                counts,
            },
        })
    }

    fn profile_column(df: &DataFrame, col_name: &str) -> Result<ColumnProfile> {
        let col = df.column(col_name)?;
        let series = col.as_materialized_series();
        let dtype = format!("{:?}", series.dtype());
        let unique_count = series.n_unique()?;
        let null_count = series.null_count();
        let null_percentage = if df.height() > 0 {
            (null_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };

        let mut sample_values = Vec::new();
        let non_null_series = series.drop_nulls();
        if !non_null_series.is_empty() {
            let sample_size = std::cmp::min(10, non_null_series.len());
            let mut rng = StdRng::seed_from_u64(42);
            let indices: Vec<usize> = (0..non_null_series.len()).collect();
            let sampled_indices: Vec<usize> = indices
                .choose_multiple(&mut rng, sample_size)
                .copied()
                .collect();

            for idx in sampled_indices {
                if let Ok(val) = non_null_series.get(idx) {
                    sample_values.push(val.str_value().to_string());
                }
            }
        }

        let stats = if is_numeric_dtype(series.dtype()) {
            describe_numeric(&float_series(series)?)?
        } else {
            describe_text(&string_values(series)?)
        };

        Ok(ColumnProfile {
            name: col_name.to_string(),
            dtype,
            unique_count,
            null_count,
            null_percentage,
            sample_values,
            stats,
        })
    }

    fn numeric_column(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
        let series = df.column(name).ok()?.as_materialized_series();
        numeric_values(series).ok()
    }

    fn text_column(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
        let series = df.column(name).ok()?.as_materialized_series();
        string_values(series).ok()
    }

    /// Leading integer of each cell; cells without digits become null.
    fn leading_integers(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
        let values = Self::text_column(df, name)?;
        Some(
            values
                .iter()
                .map(|v| v.as_deref().and_then(extract_first_integer).map(|i| i as f64))
                .collect(),
        )
    }

    fn top_tokens(df: &DataFrame, name: &str, k: usize) -> Option<CategoryCounts> {
        let values = Self::text_column(df, name)?;
        let mut counts = ordered_value_counts(
            values
                .iter()
                .flatten()
                .flat_map(|cell| split_tokens(cell)),
        );
        counts.truncate(k);
        Some(CategoryCounts {
            title: name.to_string(),
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_records() -> DataFrame {
        df![
            "Yas" => [Some(20i64), Some(40), None, Some(40)],
            "Cinsiyet" => [Some("Kadın"), Some("Erkek"), Some("Kadın"), Some("Erkek")],
            "TedaviSuresi" => ["5 seans", "10 seans", "5 seans", "10 seans"],
            "UygulamaSuresi" => ["10 Dakika", "20 Dakika", "5 Dakika", "20 Dakika"],
            "KronikHastalik" => [Some("Diyabet, Astım"), Some("Astım"), None, Some("Astım")],
            "Alerji" => [Some("Polen"), None, None, None],
        ]
        .unwrap()
    }

    fn config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.columns.multi_valued = vec!["KronikHastalik".to_string(), "Alerji".to_string()];
        config
    }

    #[test]
    fn test_profile_dataset_basic_counts() {
        let profile = DataProfiler::profile_dataset(&raw_records(), &config()).unwrap();

        assert_eq!(profile.shape, (4, 6));
        assert_eq!(profile.duplicate_count, 1);
        assert_eq!(profile.duplicate_percentage, 25.0);
        assert_eq!(profile.column("Yas").unwrap().null_count, 1);
        assert_eq!(profile.column("Alerji").unwrap().null_count, 3);
        assert_eq!(profile.total_missing(), 5);
    }

    #[test]
    fn test_describe_stats_by_dtype() {
        let profile = DataProfiler::profile_dataset(&raw_records(), &config()).unwrap();

        let age = &profile.column("Yas").unwrap().stats;
        assert_eq!(age.count, 3);
        assert_eq!(age.median, Some(40.0));
        assert!(age.top.is_none());

        let gender = &profile.column("Cinsiyet").unwrap().stats;
        assert_eq!(gender.unique, Some(2));
        assert_eq!(gender.top.as_deref(), Some("Kadın"));
        assert!(gender.mean.is_none());
    }

    #[test]
    fn test_exploratory_diagnostics() {
        let profile = DataProfiler::profile_dataset(&raw_records(), &config()).unwrap();

        assert_eq!(profile.age_histogram.as_ref().unwrap().total(), 3);
        assert_eq!(profile.age_histogram.as_ref().unwrap().counts.len(), 20);
        assert_eq!(profile.treatment_duration_histogram.as_ref().unwrap().total(), 4);

        let target = profile.target_distribution.as_ref().unwrap();
        assert_eq!(
            target.counts,
            vec![("5 seans".to_string(), 2), ("10 seans".to_string(), 2)]
        );

        let correlation = profile.correlation.as_ref().unwrap();
        assert_eq!(correlation.columns, vec!["Yas", "UygulamaSuresi"]);
        assert!((correlation.get("Yas", "UygulamaSuresi").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_tokens() {
        let profile = DataProfiler::profile_dataset(&raw_records(), &config()).unwrap();

        assert_eq!(profile.token_frequencies.len(), 2);
        assert_eq!(
            profile.token_frequencies[0].counts,
            vec![("Astım".to_string(), 3), ("Diyabet".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_tokens_truncates() {
        let mut config = config();
        config.top_tokens = 1;
        let profile = DataProfiler::profile_dataset(&raw_records(), &config).unwrap();
        assert_eq!(profile.token_frequencies[0].counts.len(), 1);
    }

    #[test]
    fn test_missing_diagnostic_columns_are_skipped() {
        let df = df!["Other" => [1, 2]].unwrap();
        let profile = DataProfiler::profile_dataset(&df, &config()).unwrap();
        assert!(profile.age_histogram.is_none());
        assert!(profile.correlation.is_none());
        assert!(profile.token_frequencies.is_empty());
    }

    #[test]
    fn test_profile_final_age_groups() {
        let df = df![
            "Yas" => [0.0, 0.5, 1.0],
            "TedaviSuresi" => [5i64, 10, 5],
            "Yas_Grubu" => [Some("Genç"), Some("Genç"), Some("Yaşlı")],
        ]
        .unwrap();

        let diagnostics = DataProfiler::profile_final(&df, &config()).unwrap();
        assert_eq!(diagnostics.shape, (3, 3));
        assert_eq!(
            diagnostics.age_group_counts.counts,
            vec![
                ("Genç".to_string(), 2),
                ("Orta Yaş".to_string(), 0),
                ("Yaşlı".to_string(), 1),
                ("Çok Yaşlı".to_string(), 0),
            ]
        );
        assert_eq!(diagnostics.age_histogram.unwrap().total(), 3);
    }
}
