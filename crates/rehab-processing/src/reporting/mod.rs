//! Diagnostics output, run reports and the CSV writer.
//!
//! - [`DiagnosticsSink`] receives the raw-table profile and the final
//!   diagnostics; [`ConsoleDiagnostics`] prints them as text.
//! - [`RunReport`] gathers everything a run produced for JSON output
//!   (`--json` to stdout, `--emit-report` to a file).
//! - [`CsvTableWriter`] writes the cleaned table.
//!
//! # Example
//!
//! ```rust,ignore
//! use rehab_processing::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report("records.xlsx", &result);
//! ReportGenerator::write_report_to_file(&report, "out/report.json")?;
//! ```

mod console;
mod generator;
mod writer;

pub use console::ConsoleDiagnostics;
pub use generator::{ReportGenerator, RunReport};
pub use writer::CsvTableWriter;

use crate::types::{DatasetProfile, FinalDiagnostics};

/// Receiver of pipeline diagnostics.
///
/// Diagnostics are never required for correctness; a pipeline without a
/// sink still computes the profile and returns it in its result.
pub trait DiagnosticsSink: Send + Sync {
    /// Called with the profile of the raw table, before any transformation.
    fn on_profile(&self, profile: &DatasetProfile);

    /// Called with diagnostics over the final table.
    fn on_complete(&self, diagnostics: &FinalDiagnostics);
}
