//! Pipeline module.
//!
//! This module provides the main cleaning pipeline, the record of parameters
//! it fits, and progress reporting.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};

use crate::config::ColumnSchema;
use crate::encoders::EncodingParams;
use crate::error::Result;
use crate::features::{DurationNormalizer, FeatureEngineer};
use crate::imputers::ImputationParams;
use crate::scaling::FittedScaler;
use crate::types::{DatasetProfile, FinalDiagnostics, PipelineSummary};
use crate::utils::ensure_columns;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters learned by one run.
///
/// [`FittedParams::transform`] replays imputation, encoding, duration
/// extraction, feature derivation and scaling on new records without
/// refitting anything. Deduplication is not replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedParams {
    pub columns: ColumnSchema,
    pub imputation: ImputationParams,
    pub encoding: EncodingParams,
    pub scaler: FittedScaler,
}

impl FittedParams {
    pub fn transform(&self, df: DataFrame) -> Result<DataFrame> {
        ensure_columns(&df, &self.columns.required_input_columns())?;

        let (df, _) = self.imputation.apply(df)?;
        let df = self.encoding.apply(df)?;
        let df = DurationNormalizer::extract_durations(df, &self.columns.duration_columns())?;
        let (df, _) = FeatureEngineer::add_features(df, &self.columns)?;
        self.scaler.transform(df)
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The cleaned, encoded and scaled table.
    pub data: DataFrame,
    pub params: FittedParams,
    pub summary: PipelineSummary,
    /// Profile of the raw table, when diagnostics are enabled.
    pub profile: Option<DatasetProfile>,
    /// Diagnostics of the final table, when diagnostics are enabled.
    pub final_diagnostics: Option<FinalDiagnostics>,
    /// Where the cleaned CSV was written, if it was.
    pub output_path: Option<PathBuf>,
}
