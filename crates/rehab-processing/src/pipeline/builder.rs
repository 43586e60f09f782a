//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning and feature engineering workflow.

use super::{FittedParams, PipelineResult};
use crate::cleaner::Deduplicator;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::encoders::Encoder;
use crate::error::{Result, ResultExt};
use crate::features::{DurationNormalizer, FeatureEngineer};
use crate::imputers::Imputer;
use crate::loader::DataLoader;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::reporting::{CsvTableWriter, DiagnosticsSink, ReportGenerator};
use crate::scaling::FittedScaler;
use crate::types::PipelineSummary;
use crate::utils::ensure_columns;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use rehab_processing::{ConsoleDiagnostics, Pipeline, PipelineConfig, ScalingMethod};
/// use std::sync::Arc;
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().scaling_method(ScalingMethod::Standard).build()?)
///     .diagnostics(Arc::new(ConsoleDiagnostics))
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run("Talent_Academy_Case_DT_2025.xlsx")?;
///
/// // Replay the fitted stages on new records
/// let scored = result.params.transform(new_records)?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load `input` and run every stage on it.
    ///
    /// Writes the cleaned CSV when `save_to_disk` is set and the JSON run
    /// report when `report_path` is set.
    pub fn run(&self, input: impl AsRef<Path>) -> Result<PipelineResult> {
        let outcome = self.run_internal(input.as_ref());
        self.finish(outcome)
    }

    /// Run every stage on an already loaded table.
    ///
    /// Returns a `PipelineResult` containing the cleaned data, the fitted
    /// parameters and the run summary.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        let outcome = self
            .process_internal(df)
            .and_then(|result| self.persist(None, result));
        self.finish(outcome)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn start_stage(&self, stage: PipelineStage, message: &str) {
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn finish(&self, outcome: Result<PipelineResult>) -> Result<PipelineResult> {
        match outcome {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self, input: &Path) -> Result<PipelineResult> {
        self.start_stage(PipelineStage::Loading, "Loading data...");
        info!("Loading {}", input.display());
        let df = DataLoader::load(input)?;

        let result = self.process_internal(df)?;
        self.persist(Some(input), result)
    }

    /// Step 8: write the run report, then the cleaned CSV.
    ///
    /// The CSV is written last, and a report written by this call is
    /// removed again when the CSV write fails.
    fn persist(&self, input: Option<&Path>, mut result: PipelineResult) -> Result<PipelineResult> {
        if self.config.save_to_disk {
            self.start_stage(PipelineStage::Writing, "Writing cleaned data...");
            info!("Step 8: Writing cleaned data...");
            result.output_path = Some(self.config.output_path.clone());
            result
                .summary
                .add_step(format!("Saved {}", self.config.output_path.display()));
        } else {
            info!("Step 8: Skipping write (save_to_disk disabled)");
        }

        let report_path = match (input, &self.config.report_path) {
            (Some(input), Some(path)) => {
                let report = ReportGenerator::build_report(input, &result);
                Some(ReportGenerator::write_report_to_file(&report, path)?)
            }
            _ => None,
        };

        if let Some(output_path) = &result.output_path {
            if let Err(e) = CsvTableWriter::write(&mut result.data, output_path) {
                if let Some(report_path) = report_path {
                    if let Err(remove_err) = std::fs::remove_file(&report_path) {
                        warn!(
                            "Could not remove report {}: {}",
                            report_path.display(),
                            remove_err
                        );
                    }
                }
                return Err(e);
            }
        }

        Ok(result)
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let columns = &self.config.columns;

        info!("Starting cleaning pipeline...");
        ensure_columns(&df, &columns.required_input_columns())?;

        let mut summary = PipelineSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();

        // Step 1: Profile the raw table
        let profile = if self.config.run_diagnostics {
            self.start_stage(PipelineStage::Profiling, "Profiling dataset...");
            info!("Step 1: Profiling dataset...");
            let profile = DataProfiler::profile_dataset(&df, &self.config)?;
            debug!("Shape: {:?}", profile.shape);
            for col in &profile.column_profiles {
                debug!("  {}: {} ({} missing)", col.name, col.dtype, col.null_count);
            }
            if let Some(sink) = &self.diagnostics {
                sink.on_profile(&profile);
            }
            summary.add_step("Profiled raw dataset");
            Some(profile)
        } else {
            info!("Step 1: Skipping profiling (diagnostics disabled)");
            None
        };

        // Step 2: Deduplicate
        self.start_stage(PipelineStage::Deduplication, "Removing duplicate rows...");
        info!("Step 2: Removing duplicate rows...");
        let (df, removed) = Deduplicator::remove_duplicates(df)?;
        summary.duplicates_removed = removed;
        summary.add_step(format!("Removed {} duplicate rows", removed));

        // Step 3: Impute
        self.start_stage(PipelineStage::Imputation, "Imputing missing values...");
        info!("Step 3: Imputing missing values...");
        let (df, imputation, filled) =
            Imputer::fit_transform(df, columns).context("During imputation")?;
        for (col, value) in &imputation.numeric {
            summary.add_step(format!("Filled '{}' with median: {:.2}", col, value));
        }
        for (col, value) in &imputation.categorical {
            summary.add_step(format!("Filled '{}' with mode: '{}'", col, value));
        }
        summary.values_imputed = filled;

        // Step 4: Encode
        self.start_stage(PipelineStage::Encoding, "Encoding categorical columns...");
        info!("Step 4: Encoding categorical columns...");
        let (df, encoding) = Encoder::fit_transform(df, columns).context("During encoding")?;
        summary.columns_encoded = encoding.indicator_counts();
        summary.add_step(format!(
            "Encoded {} columns into {} indicators",
            summary.columns_encoded.len(),
            summary.columns_encoded.values().sum::<usize>()
        ));

        // Step 5: Extract integer durations
        self.start_stage(
            PipelineStage::NumericNormalization,
            "Extracting integer durations...",
        );
        info!("Step 5: Extracting integer durations...");
        let df = DurationNormalizer::extract_durations(df, &columns.duration_columns())?;
        summary.add_step("Extracted integer durations");

        // Step 6: Derived features
        self.start_stage(PipelineStage::FeatureEngineering, "Adding derived features...");
        info!("Step 6: Adding derived features...");
        let (df, warnings) = FeatureEngineer::add_features(df, columns)?;
        for warning in warnings {
            summary.add_warning(warning);
        }
        summary.add_step(format!(
            "Added '{}' and '{}'",
            columns.age_group, columns.duration_ratio
        ));

        // Step 7: Scale
        self.start_stage(PipelineStage::Scaling, "Scaling numeric columns...");
        info!(
            "Step 7: Scaling numeric columns ({})...",
            self.config.scaling_method
        );
        let (df, scaler) = FittedScaler::fit_transform(
            df,
            &columns.scaled_columns(),
            self.config.scaling_method,
        )
        .context("During scaling")?;
        summary.add_step(format!(
            "Scaled {} columns with {}",
            scaler.params.len(),
            scaler.method
        ));

        let final_diagnostics = if self.config.run_diagnostics {
            let diagnostics = DataProfiler::profile_final(&df, &self.config)?;
            if let Some(sink) = &self.diagnostics {
                sink.on_complete(&diagnostics);
            }
            Some(diagnostics)
        } else {
            None
        };

        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaning finished in {} ms: {} rows x {} columns",
            summary.duration_ms, summary.rows_after, summary.columns_after
        );

        Ok(PipelineResult {
            data: df,
            params: FittedParams {
                columns: columns.clone(),
                imputation,
                encoding,
                scaler,
            },
            summary,
            profile,
            final_diagnostics,
            output_path: None,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use rehab_processing::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Receive the raw profile and final diagnostics.
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            diagnostics: self.diagnostics,
        })
    }
}
