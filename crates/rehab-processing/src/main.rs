//! CLI entry point for the rehabilitation records cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use rehab_processing::{
    ConsoleDiagnostics, Pipeline, PipelineConfig, PipelineResult, ReportGenerator, RunReport,
    ScalingMethod,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cleaning and feature-engineering pipeline for rehabilitation records",
    long_about = "Loads a table of patient treatment records, removes duplicates, imputes \
                  missing values, encodes categorical and multi-valued columns, derives \
                  age group and duration ratio features, scales the numeric columns and \
                  writes the result as CSV.\n\n\
                  EXAMPLES:\n  \
                  # Basic usage (min-max scaling, writes cleaned_data.csv)\n  \
                  rehab-processing -i records.xlsx\n\n  \
                  # Standard scaling and a custom output path\n  \
                  rehab-processing -i records.csv --scaling standard -o out/cleaned.csv\n\n  \
                  # Machine-readable report on stdout\n  \
                  rehab-processing -i records.csv --json | jq .summary"
)]
struct Args {
    /// Path to the input table (.csv, .xlsx, .xls or .ods)
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the cleaned CSV [default: cleaned_data.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scaling method for the numeric columns (minmax or standard) [default: minmax]
    #[arg(short, long)]
    scaling: Option<String>,

    /// JSON file with pipeline configuration
    ///
    /// Command-line flags take precedence over values from this file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip profiling and final diagnostics
    #[arg(long)]
    no_diagnostics: bool,

    /// Write a detailed JSON report to this path
    #[arg(short = 'r', long)]
    emit_report: Option<PathBuf>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs and diagnostics tables; only outputs the
    /// final JSON report.
    #[arg(long)]
    json: bool,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    run_pipeline(&pipeline, &args)
}

/// Merge the optional config file with command-line flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(scaling) = &args.scaling {
        config.scaling_method = ScalingMethod::from_str(scaling)?;
    }
    if args.no_diagnostics {
        config.run_diagnostics = false;
    }
    if let Some(report) = &args.emit_report {
        config.report_path = Some(report.clone());
    }

    config.validate()?;
    Ok(config)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
        builder = builder.diagnostics(Arc::new(ConsoleDiagnostics));
    }

    Ok(builder.build()?)
}

/// Run pipeline and print results
fn run_pipeline(pipeline: &Pipeline, args: &Args) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting rehabilitation records pipeline...");
    info!("{}", "=".repeat(80));

    let result = match pipeline.run(&args.input) {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed [{}]: {}", e.error_code(), e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    let report = ReportGenerator::build_report(&args.input, &result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report, &result);
    Ok(())
}

/// Print human-readable summary to stdout.
///
/// Note: This function uses `println!` intentionally as it's user-facing CLI output,
/// not logging. These messages are the primary output of the CLI tool.
fn print_human_readable_summary(report: &RunReport, result: &PipelineResult) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("PIPELINE COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, summary.rows_before, summary.columns_before
    );
    match &report.output_file {
        Some(output) => println!(
            "Output: {} ({} rows x {} columns)",
            output, summary.rows_after, summary.columns_after
        ),
        None => println!(
            "Output: not written ({} rows x {} columns)",
            summary.rows_after, summary.columns_after
        ),
    }
    println!("Scaling: {}", report.scaling_method);
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} duplicates removed)",
        summary.rows_before, summary.rows_after, summary.duplicates_removed
    );
    println!("  Values imputed: {}", summary.total_imputed());
    for (column, count) in summary.values_imputed.iter().filter(|(_, c)| **c > 0) {
        println!("    - {}: {}", column, count);
    }
    println!("  Indicator columns:");
    for (column, count) in &summary.columns_encoded {
        println!("    - {}: {}", column, count);
    }
    println!();

    println!("Scaling Parameters:");
    for p in &result.params.scaler.params {
        println!("  {:<20} center={:.4} scale={:.4}", p.column, p.center, p.scale);
    }
    println!();

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    if let Some(path) = result.output_path.as_deref().filter(|p| p.exists()) {
        println!("Cleaned data saved to: {}", path.display());
    }
    println!("{}", "=".repeat(80));
}
