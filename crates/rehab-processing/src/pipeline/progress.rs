//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use rehab_processing::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df);
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the input file
    Loading,
    /// Profiling the raw table
    Profiling,
    /// Removing exact duplicate rows
    Deduplication,
    /// Imputing missing values
    Imputation,
    /// One-hot and multi-hot encoding
    Encoding,
    /// Extracting integers from text-tagged durations
    NumericNormalization,
    /// Deriving age group and duration ratio
    FeatureEngineering,
    /// Scaling the designated numeric columns
    Scaling,
    /// Writing the cleaned table and final diagnostics
    Writing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Profiling => "Profiling Dataset",
            Self::Deduplication => "Removing Duplicates",
            Self::Imputation => "Imputing Values",
            Self::Encoding => "Encoding Categories",
            Self::NumericNormalization => "Extracting Durations",
            Self::FeatureEngineering => "Engineering Features",
            Self::Scaling => "Scaling",
            Self::Writing => "Writing Output",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// The weights of the processing stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Profiling => 0.15,
            Self::Deduplication => 0.05,
            Self::Imputation => 0.10,
            Self::Encoding => 0.20,
            Self::NumericNormalization => 0.05,
            Self::FeatureEngineering => 0.10,
            Self::Scaling => 0.05,
            Self::Writing => 0.20,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Profiling => 0.10,
            Self::Deduplication => 0.25,
            Self::Imputation => 0.30,
            Self::Encoding => 0.40,
            Self::NumericNormalization => 0.60,
            Self::FeatureEngineering => 0.65,
            Self::Scaling => 0.75,
            Self::Writing => 0.80,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update sent to a [`ProgressReporter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Optional sub-stage description (e.g., "Column: Bolum")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a progress update with sub-stage information.
    pub fn with_sub_stage(
        stage: PipelineStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, 1.0, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, 0.0, message)
    }
}

/// Trait for receiving progress updates from the pipeline.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start of each stage and when the run ends.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
