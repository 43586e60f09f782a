//! Rehabilitation Records Cleaning Library
//!
//! A cleaning and feature-engineering pipeline for patient rehabilitation
//! records, built with Rust and Polars.
//!
//! # Overview
//!
//! Given a table of treatment records (one row per treatment episode), the
//! pipeline produces a model-ready table:
//!
//! - **Loading**: CSV and spreadsheet (`.xlsx`, `.xls`, `.ods`) input
//! - **Profiling**: Per-column statistics, histograms, correlation and token frequencies
//! - **Deduplication**: Exact duplicate rows removed, first occurrence kept
//! - **Imputation**: Median for numeric columns, mode for categorical ones
//! - **Encoding**: One-hot indicators for categorical columns, multi-hot for
//!   comma-separated multi-valued columns
//! - **Feature Engineering**: Duration digits, age group and duration ratio
//! - **Scaling**: Min-max or standard scaling of the numeric columns
//! - **Progress Reporting**: Per-stage progress updates
//!
//! Every stage that learns something returns its parameters, collected in
//! [`FittedParams`], so a run can be replayed on new records.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rehab_processing::{Pipeline, PipelineConfig, ScalingMethod};
//!
//! let config = PipelineConfig::builder()
//!     .scaling_method(ScalingMethod::Standard)
//!     .output_path("out/cleaned_data.csv")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("records.xlsx")?;
//!
//! println!("{} rows written", result.data.height());
//!
//! // Later, on new records:
//! let replayed = result.params.transform(new_df)?;
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to choose the scaling method, the output path and
//! the diagnostics settings. Column names default to the record layout
//! described by [`ColumnSchema`] and can be overridden from a JSON file:
//!
//! ```rust,ignore
//! let config = PipelineConfig::from_json_file("pipeline.json")?;
//! ```
//!
//! # Diagnostics
//!
//! Attach a [`DiagnosticsSink`] to receive the raw-table profile and the
//! final diagnostics. [`ConsoleDiagnostics`] prints them as text tables and
//! histograms.

pub mod cleaner;
pub mod config;
pub mod encoders;
pub mod error;
pub mod features;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod scaling;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::Deduplicator;
pub use config::{
    ColumnSchema, ConfigValidationError, PipelineConfig, PipelineConfigBuilder, ScalingMethod,
};
pub use encoders::{Encoder, EncodingParams, MultiHotEncoder, OneHotEncoder, Vocabulary};
pub use error::{ErrorKind, PipelineError, Result, ResultExt};
pub use features::{AgeGroup, DurationNormalizer, FeatureEngineer};
pub use imputers::{ImputationParams, Imputer, StatisticalImputer};
pub use loader::{DataLoader, InputFormat};
pub use pipeline::{
    ClosureProgressReporter, FittedParams, Pipeline, PipelineBuilder, PipelineResult,
    PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use reporting::{ConsoleDiagnostics, CsvTableWriter, DiagnosticsSink, ReportGenerator, RunReport};
pub use scaling::{ColumnScaling, FittedScaler};
pub use types::{
    CategoryCounts, ColumnProfile, CorrelationMatrix, DatasetProfile, DescribeStats,
    FinalDiagnostics, Histogram, PipelineSummary,
};
