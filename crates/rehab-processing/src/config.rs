//! Configuration types for the rehabilitation records pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Scaling transform applied to the designated numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMethod {
    /// Rescale each column to [0, 1] using its observed min and max
    #[default]
    MinMax,
    /// Rescale each column to zero mean and unit (population) variance
    Standard,
}

impl ScalingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinMax => "minmax",
            Self::Standard => "standard",
        }
    }
}

impl fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalingMethod {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minmax" => Ok(Self::MinMax),
            "standard" => Ok(Self::Standard),
            other => Err(PipelineError::InvalidConfig(format!(
                "scaling method should be 'minmax' or 'standard', got '{}'",
                other
            ))),
        }
    }
}

/// Column names the pipeline relies on.
///
/// The defaults match the source rehabilitation dataset. Every stage looks
/// columns up by these names, so a renamed input column must be reflected
/// here or the run fails with a schema error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Patient age (numeric, median-imputed)
    pub age: String,
    /// Categorical columns imputed with the mode and one-hot encoded
    pub categorical: Vec<String>,
    /// Categorical columns one-hot encoded without imputation
    pub encode_only: Vec<String>,
    /// Treatment duration, text-tagged (e.g. "10 seans")
    pub treatment_duration: String,
    /// Application duration, text-tagged (e.g. "20 dakika")
    pub application_duration: String,
    /// Comma-separated multi-valued text columns
    pub multi_valued: Vec<String>,
    /// Output name of the derived age group column
    pub age_group: String,
    /// Output name of the derived application-per-session ratio
    pub duration_ratio: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            age: "Yas".to_string(),
            categorical: vec![
                "Cinsiyet".to_string(),
                "KanGrubu".to_string(),
                "Uyruk".to_string(),
                "Bolum".to_string(),
            ],
            encode_only: vec!["TedaviAdi".to_string()],
            treatment_duration: "TedaviSuresi".to_string(),
            application_duration: "UygulamaSuresi".to_string(),
            multi_valued: vec![
                "KronikHastalik".to_string(),
                "Alerji".to_string(),
                "Tanilar".to_string(),
                "UygulamaYerleri".to_string(),
            ],
            age_group: "Yas_Grubu".to_string(),
            duration_ratio: "UygulamaSuresi_per_Seans".to_string(),
        }
    }
}

impl ColumnSchema {
    /// Columns that must be present in the loaded table.
    pub fn required_input_columns(&self) -> Vec<&str> {
        let mut cols = vec![self.age.as_str()];
        cols.extend(self.categorical.iter().map(String::as_str));
        cols.extend(self.encode_only.iter().map(String::as_str));
        cols.push(self.treatment_duration.as_str());
        cols.push(self.application_duration.as_str());
        cols.extend(self.multi_valued.iter().map(String::as_str));
        cols
    }

    /// Columns one-hot encoded, in encoding order.
    pub fn one_hot_columns(&self) -> Vec<&str> {
        self.categorical
            .iter()
            .chain(self.encode_only.iter())
            .map(String::as_str)
            .collect()
    }

    /// Text-tagged duration columns converted to integers.
    pub fn duration_columns(&self) -> [&str; 2] {
        [
            self.treatment_duration.as_str(),
            self.application_duration.as_str(),
        ]
    }

    /// Columns rescaled by the scaler.
    pub fn scaled_columns(&self) -> [&str; 3] {
        [
            self.age.as_str(),
            self.application_duration.as_str(),
            self.duration_ratio.as_str(),
        ]
    }
}

/// Configuration for the pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use rehab_processing::config::{PipelineConfig, ScalingMethod};
///
/// let config = PipelineConfig::builder()
///     .scaling_method(ScalingMethod::Standard)
///     .output_path("out/cleaned_data.csv")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scaling applied to age, application duration and the ratio feature.
    /// Default: MinMax
    pub scaling_method: ScalingMethod,

    /// Destination of the cleaned CSV.
    /// Default: "cleaned_data.csv"
    pub output_path: PathBuf,

    /// Column contract of the input table.
    pub columns: ColumnSchema,

    /// Number of bins for numeric histograms in diagnostics.
    /// Default: 20
    pub histogram_bins: usize,

    /// Number of most frequent tokens reported per multi-valued column.
    /// Default: 10
    pub top_tokens: usize,

    /// Whether to compute profile and final diagnostics.
    /// Default: true
    pub run_diagnostics: bool,

    /// Optional path of a JSON run report.
    /// Default: None
    pub report_path: Option<PathBuf>,

    /// Whether to write the cleaned table to `output_path`.
    /// When false, the table is only returned in memory.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scaling_method: ScalingMethod::default(),
            output_path: PathBuf::from("cleaned_data.csv"),
            columns: ColumnSchema::default(),
            histogram_bins: 20,
            top_tokens: 10,
            run_diagnostics: true,
            report_path: None,
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    ///
    /// Fields missing from the file keep their default values. Malformed
    /// JSON and unknown values (such as an unrecognized scaling method) are
    /// reported as [`PipelineError::InvalidConfig`].
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content).map_err(|e| {
            PipelineError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        config
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "histogram_bins".to_string(),
                value: self.histogram_bins,
            });
        }

        if self.top_tokens == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "top_tokens".to_string(),
                value: self.top_tokens,
            });
        }

        if self.save_to_disk && self.output_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyOutputPath);
        }

        let cols = &self.columns;
        let mut seen = std::collections::HashSet::new();
        for name in cols
            .required_input_columns()
            .into_iter()
            .chain([cols.age_group.as_str(), cols.duration_ratio.as_str()])
        {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName);
            }
            if !seen.insert(name) {
                return Err(ConfigValidationError::DuplicateColumn(name.to_string()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    InvalidCount { field: String, value: usize },

    #[error("Output path must not be empty when saving to disk")]
    EmptyOutputPath,

    #[error("Column names must not be empty")]
    EmptyColumnName,

    #[error("Column '{0}' is assigned more than one role")]
    DuplicateColumn(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    scaling_method: Option<ScalingMethod>,
    output_path: Option<PathBuf>,
    columns: Option<ColumnSchema>,
    histogram_bins: Option<usize>,
    top_tokens: Option<usize>,
    run_diagnostics: Option<bool>,
    report_path: Option<PathBuf>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the scaling method.
    pub fn scaling_method(mut self, method: ScalingMethod) -> Self {
        self.scaling_method = Some(method);
        self
    }

    /// Set the destination of the cleaned CSV.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Override the column contract.
    pub fn columns(mut self, columns: ColumnSchema) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set the number of histogram bins used in diagnostics.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many top tokens are reported per multi-valued column.
    pub fn top_tokens(mut self, k: usize) -> Self {
        self.top_tokens = Some(k);
        self
    }

    /// Enable or disable diagnostics.
    pub fn run_diagnostics(mut self, enable: bool) -> Self {
        self.run_diagnostics = Some(enable);
        self
    }

    /// Write a JSON run report to this path.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Enable or disable writing the cleaned table to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            scaling_method: self.scaling_method.unwrap_or_default(),
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from("cleaned_data.csv")),
            columns: self.columns.unwrap_or_default(),
            histogram_bins: self.histogram_bins.unwrap_or(20),
            top_tokens: self.top_tokens.unwrap_or(10),
            run_diagnostics: self.run_diagnostics.unwrap_or(true),
            report_path: self.report_path,
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
