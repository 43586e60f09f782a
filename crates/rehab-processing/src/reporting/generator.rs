use crate::config::ScalingMethod;
use crate::error::{PipelineError, Result};
use crate::pipeline::{FittedParams, PipelineResult};
use crate::types::{DatasetProfile, FinalDiagnostics, PipelineSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Run Report Types
// ============================================================================

/// Everything a run produced, in one serializable record.
///
/// Used for JSON output to stdout (`--json`), for the report file
/// (`--emit-report`), and in library mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned CSV (if written)
    pub output_file: Option<String>,
    pub scaling_method: ScalingMethod,

    pub summary: PipelineSummary,

    /// Profile of the raw table (absent when diagnostics are disabled)
    pub profile: Option<DatasetProfile>,
    /// Diagnostics of the final table (absent when diagnostics are disabled)
    pub final_diagnostics: Option<FinalDiagnostics>,

    /// Fitted parameters, enough to replay the run on new data
    pub params: FittedParams,
}

pub struct ReportGenerator;

impl ReportGenerator {
    /// Build a report from a finished run.
    pub fn build_report(input_file: impl AsRef<Path>, result: &PipelineResult) -> RunReport {
        RunReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.as_ref().display().to_string(),
            output_file: result
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            scaling_method: result.params.scaler.method,
            summary: result.summary.clone(),
            profile: result.profile.clone(),
            final_diagnostics: result.final_diagnostics.clone(),
            params: result.params.clone(),
        }
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// Filesystem failures are reported as [`PipelineError::WriteFailed`].
    pub fn write_report_to_file(report: &RunReport, path: impl AsRef<Path>) -> Result<PathBuf> {
        let report_path = path.as_ref().to_path_buf();
        let json = serde_json::to_string_pretty(report)?;

        Self::write_json(&report_path, &json).map_err(|e| PipelineError::WriteFailed {
            path: report_path.clone(),
            reason: e.to_string(),
        })?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    fn write_json(path: &Path, json: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        File::create(path)?.write_all(json.as_bytes())
    }
}
