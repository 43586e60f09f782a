use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Profile Types
// ============================================================================

/// Descriptive statistics for one column, in the spirit of `describe`.
///
/// Numeric columns fill the moment/quantile fields; text columns fill
/// `unique`, `top` and `freq`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeStats {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub unique_count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    pub sample_values: Vec<String>,
    pub stats: DescribeStats,
}

/// Equal-width histogram over the non-null values of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub title: String,
    /// Bin edges, `counts.len() + 1` long.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Counts per distinct label (a bar or count plot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub title: String,
    pub counts: Vec<(String, usize)>,
}

/// Pearson correlation matrix; `None` where a coefficient is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Profile of the raw table, computed before any transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    pub duplicate_count: usize,
    pub duplicate_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_histogram: Option<Histogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_duration_histogram: Option<Histogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationMatrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_distribution: Option<CategoryCounts>,
    /// Most frequent tokens per multi-valued column, in column order.
    pub token_frequencies: Vec<CategoryCounts>,
}

impl DatasetProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|c| c.name == name)
    }

    pub fn total_missing(&self) -> usize {
        self.column_profiles.iter().map(|c| c.null_count).sum()
    }
}

/// Diagnostics over the final, transformed table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalDiagnostics {
    pub shape: (usize, usize),
    pub age_histogram: Option<Histogram>,
    pub treatment_duration_histogram: Option<Histogram>,
    pub age_group_counts: CategoryCounts,
}

// ============================================================================
// Run Summary Types
// ============================================================================

/// Human-readable summary of what the pipeline did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Exact duplicate rows dropped.
    pub duplicates_removed: usize,
    /// Number of cells filled per column.
    pub values_imputed: BTreeMap<String, usize>,
    /// Indicator columns created per encoded column.
    pub columns_encoded: BTreeMap<String, usize>,

    /// Ordered log of the steps executed.
    pub steps: Vec<String>,
    /// Warnings generated during processing.
    pub warnings: Vec<String>,
}

impl PipelineSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn total_imputed(&self) -> usize {
        self.values_imputed.values().sum()
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}
