//! Integration tests for the rehabilitation records pipeline.
//!
//! These tests run the pipeline end to end on the CSV fixtures, writing into
//! temporary directories.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rehab_processing::{
    ErrorKind, Pipeline, PipelineConfig, PipelineStage, ProgressUpdate, ReportGenerator, RunReport,
    ScalingMethod,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn read_output(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn config_writing_to(dir: &TempDir) -> PipelineConfig {
    PipelineConfig::builder()
        .output_path(dir.path().join("cleaned_data.csv"))
        .build()
        .unwrap()
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.expect("no nulls expected"))
        .collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "expected {:?}, got {:?}", expected, actual);
    }
}

// ============================================================================
// End-to-End Runs
// ============================================================================

#[test]
fn test_full_run_writes_cleaned_csv() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::builder()
        .config(config_writing_to(&dir))
        .build()
        .unwrap();

    let result = pipeline.run(fixture("records.csv")).unwrap();

    // one exact duplicate dropped
    assert_eq!(result.summary.rows_before, 4);
    assert_eq!(result.summary.duplicates_removed, 1);
    assert_eq!(result.data.height(), 3);

    // the missing age is filled with the median of 30 and 70
    assert_eq!(
        result.params.imputation.numeric,
        vec![("Yas".to_string(), 50.0)]
    );
    assert_eq!(result.summary.values_imputed.get("Yas"), Some(&1));

    let output = result.output_path.clone().expect("output written");
    assert!(output.exists());

    let written = read_output(&output);
    assert_eq!(written.shape(), result.data.shape());
    assert_eq!(written.get_column_names()[0].as_str(), "Yas");

    assert_close(&f64_column(&written, "Yas"), &[0.0, 0.5, 1.0]);
    assert_close(&f64_column(&written, "TedaviSuresi"), &[5.0, 10.0, 15.0]);
    assert_close(&f64_column(&written, "UygulamaSuresi"), &[0.5, 0.0, 1.0]);
    // ratios 4, 1 and 2 before scaling
    assert_close(
        &f64_column(&written, "UygulamaSuresi_per_Seans"),
        &[1.0, 0.0, 1.0 / 3.0],
    );

    let groups: Vec<Option<&str>> = written
        .column("Yas_Grubu")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(groups, vec![Some("Genç"), Some("Orta Yaş"), Some("Yaşlı")]);
}

#[test]
fn test_three_row_run_dedups_imputes_and_extracts() {
    let config = PipelineConfig::builder().save_to_disk(false).build().unwrap();
    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("three_rows.csv"))
        .unwrap();

    assert_eq!(result.data.height(), 2);
    assert_eq!(result.data.column("Yas").unwrap().null_count(), 0);
    assert_eq!(
        result.params.imputation.numeric,
        vec![("Yas".to_string(), 40.0)]
    );

    let durations: Vec<Option<i64>> = result
        .data
        .column("TedaviSuresi")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(durations, vec![Some(5), Some(10)]);

    // both ages equal the median, so the constant column scales to 0
    assert_close(&f64_column(&result.data, "Yas"), &[0.0, 0.0]);
}

#[test]
fn test_spreadsheet_run_matches_csv_run() {
    let config = PipelineConfig::builder().save_to_disk(false).build().unwrap();
    let pipeline = Pipeline::builder().config(config).build().unwrap();

    let from_xlsx = pipeline.run(fixture("three_rows.xlsx")).unwrap();
    assert_eq!(from_xlsx.summary.rows_before, 3);
    assert_eq!(from_xlsx.summary.duplicates_removed, 1);
    assert_eq!(from_xlsx.data.height(), 2);
    assert_eq!(
        from_xlsx.params.imputation.numeric,
        vec![("Yas".to_string(), 40.0)]
    );

    let durations: Vec<Option<i64>> = from_xlsx
        .data
        .column("TedaviSuresi")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(durations, vec![Some(5), Some(10)]);

    let from_csv = pipeline.run(fixture("three_rows.csv")).unwrap();
    assert_eq!(
        from_xlsx.data.get_column_names(),
        from_csv.data.get_column_names()
    );
    assert_eq!(from_xlsx.params.encoding, from_csv.params.encoding);
}

#[test]
fn test_full_run_encodes_categories_and_tokens() {
    let dir = TempDir::new().unwrap();
    let result = Pipeline::builder()
        .config(config_writing_to(&dir))
        .build()
        .unwrap()
        .run(fixture("records.csv"))
        .unwrap();
    let df = &result.data;

    for original in ["Cinsiyet", "KanGrubu", "Uyruk", "Bolum", "TedaviAdi", "Alerji"] {
        assert!(df.column(original).is_err(), "{original} should be replaced");
    }

    // mode tie between Erkek and Kadın resolves to the smaller value
    let cinsiyet = f64_column(df, "Cinsiyet_Erkek");
    assert_close(&cinsiyet, &[0.0, 1.0, 1.0]);

    let yerleri_bel = f64_column(df, "UygulamaYerleri_Bel");
    let yerleri_boyun = f64_column(df, "UygulamaYerleri_Boyun");
    assert_close(&yerleri_bel, &[1.0, 0.0, 1.0]);
    assert_close(&yerleri_boyun, &[0.0, 0.0, 1.0]);

    assert_eq!(result.summary.columns_encoded.get("UygulamaYerleri"), Some(&3));
}

#[test]
fn test_standard_scaling_from_config_file() {
    let dir = TempDir::new().unwrap();
    let mut config = PipelineConfig::from_json_file(fixture("pipeline.json")).unwrap();
    config.output_path = dir.path().join("out.csv");
    assert_eq!(config.scaling_method, ScalingMethod::Standard);
    assert_eq!(config.histogram_bins, 10);

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("records.csv"))
        .unwrap();

    for col in ["Yas", "UygulamaSuresi"] {
        let values = f64_column(&result.data, col);
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-9, "{col} mean {mean}");
        assert!((var.sqrt() - 1.0).abs() < 1e-9, "{col} std {}", var.sqrt());
    }
}

#[test]
fn test_fitted_params_replay_on_new_records() {
    let config = PipelineConfig::builder().save_to_disk(false).build().unwrap();
    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("records.csv"))
        .unwrap();

    let new_records = read_output(&fixture("new_records.csv"));
    let replayed = result.params.transform(new_records).unwrap();

    // same layout as the fitted table
    assert_eq!(replayed.get_column_names(), result.data.get_column_names());
    assert_eq!(replayed.height(), 1);

    // 45 on the fitted [30, 70] range
    assert_close(&f64_column(&replayed, "Yas"), &[0.375]);
    // unseen nationality gets all-zero indicators
    assert_close(&f64_column(&replayed, "Uyruk_Suriye"), &[0.0]);
    assert_close(&f64_column(&replayed, "Uyruk_Türkiye"), &[0.0]);
}

// ============================================================================
// Failure Modes
// ============================================================================

#[test]
fn test_invalid_scaling_name_is_rejected() {
    let err = ScalingMethod::from_str("robust").unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_unknown_scaling_in_config_file_is_a_configuration_error() {
    let err = PipelineConfig::from_json_file(fixture("bad_scaling.json")).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("bad_scaling.json"));
}

#[test]
fn test_missing_column_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = config_writing_to(&dir);
    let output = config.output_path.clone();

    let err = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("missing_column.csv"))
        .unwrap_err();

    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert!(err.to_string().contains("Tanilar"));
    assert!(!output.exists());
}

#[test]
fn test_duration_without_digits_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let config = config_writing_to(&dir);
    let output = config.output_path.clone();

    let err = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("bad_duration.csv"))
        .unwrap_err();

    assert_eq!(err.error_code(), "DIGIT_EXTRACTION_FAILED");
    assert_eq!(err.kind(), ErrorKind::DataQuality);
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_input_file() {
    let err = Pipeline::builder()
        .build()
        .unwrap()
        .run(fixture("does_not_exist.csv"))
        .unwrap_err();
    assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.to_string().contains("does_not_exist.csv"));
}

#[test]
fn test_failure_is_reported_to_progress() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    let result = Pipeline::builder()
        .config(PipelineConfig::builder().save_to_disk(false).build().unwrap())
        .on_progress(move |update: ProgressUpdate| {
            stages_clone.lock().unwrap().push(update.stage);
        })
        .build()
        .unwrap()
        .run(fixture("bad_duration.csv"));

    assert!(result.is_err());
    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::Loading));
    assert_eq!(stages.last(), Some(&PipelineStage::Failed));
    assert!(!stages.contains(&PipelineStage::Scaling));
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_run_report_written_to_report_path() {
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("reports/run.json");
    let config = PipelineConfig::builder()
        .output_path(dir.path().join("cleaned_data.csv"))
        .report_path(&report_path)
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("records.csv"))
        .unwrap();

    let json = std::fs::read_to_string(&report_path).unwrap();
    let report: RunReport = serde_json::from_str(&json).unwrap();

    assert_eq!(report.scaling_method, ScalingMethod::MinMax);
    assert_eq!(report.summary.duplicates_removed, 1);
    assert_eq!(report.params, result.params);

    let profile = report.profile.expect("diagnostics enabled");
    assert_eq!(profile.shape, (4, 12));
    assert_eq!(profile.duplicate_count, 1);
    assert_eq!(profile.column("Yas").map(|c| c.null_count), Some(1));

    let final_diagnostics = report.final_diagnostics.expect("diagnostics enabled");
    let total: usize = final_diagnostics
        .age_group_counts
        .counts
        .iter()
        .map(|(_, n)| n)
        .sum();
    assert_eq!(total, 3);
}

#[test]
fn test_failed_report_write_leaves_no_csv() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("cleaned_data.csv");
    // a directory cannot be opened as the report file
    let report_path = dir.path().join("report.json");
    std::fs::create_dir(&report_path).unwrap();

    let config = PipelineConfig::builder()
        .output_path(&output)
        .report_path(&report_path)
        .build()
        .unwrap();
    let err = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("records.csv"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Output);
    assert!(!output.exists());
}

#[test]
fn test_failed_csv_write_removes_report() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("cleaned_data.csv");
    std::fs::create_dir(&output).unwrap();
    let report_path = dir.path().join("run.json");

    let config = PipelineConfig::builder()
        .output_path(&output)
        .report_path(&report_path)
        .build()
        .unwrap();
    let err = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("records.csv"))
        .unwrap_err();

    assert_eq!(err.error_code(), "WRITE_FAILED");
    assert!(!report_path.exists());
    assert!(output.is_dir());
}

#[test]
fn test_build_report_without_diagnostics() {
    let config = PipelineConfig::builder()
        .save_to_disk(false)
        .run_diagnostics(false)
        .build()
        .unwrap();
    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("records.csv"))
        .unwrap();

    let report = ReportGenerator::build_report(fixture("records.csv"), &result);
    assert!(report.output_file.is_none());
    assert!(report.profile.is_none());
    assert!(report.final_diagnostics.is_none());
    assert!(report.input_file.ends_with("records.csv"));
}
