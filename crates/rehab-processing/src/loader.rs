//! Table loading from spreadsheets and delimited text.
//!
//! Spreadsheets (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are read with
//! `calamine` from the first worksheet, whose first row is the header.
//! CSV files go through the polars CSV reader.

use crate::error::{PipelineError, Result};
use calamine::{Data, Reader, open_workbook_auto};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Input formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            other => Err(PipelineError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Loads the patient record table.
pub struct DataLoader;

impl DataLoader {
    /// Load a table from `path`, choosing the reader by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::InputNotFound(path.to_path_buf()));
        }

        let df = match InputFormat::from_path(path)? {
            InputFormat::Csv => Self::load_csv(path)?,
            InputFormat::Spreadsheet => Self::load_spreadsheet(path)?,
        };

        info!(
            "Data loaded: {} rows, {} columns ({})",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// Load a CSV file with a header row.
    ///
    /// Reader failures (bad encoding, ragged rows, unbalanced quotes) are
    /// reported as [`PipelineError::MalformedInput`].
    pub fn load_csv(path: &Path) -> Result<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .and_then(|reader| reader.finish())
            .map_err(|e| malformed(path, e))
    }

    /// Load the first worksheet of a spreadsheet.
    pub fn load_spreadsheet(path: &Path) -> Result<DataFrame> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| PipelineError::Spreadsheet("workbook has no worksheets".to_string()))?;
        debug!("Reading worksheet '{}'", sheet_name);

        let range = workbook.worksheet_range(&sheet_name)?;
        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| PipelineError::Spreadsheet(format!("worksheet '{}' is empty", sheet_name)))?;
        let body: Vec<&[Data]> = rows.collect();

        let mut columns: Vec<Column> = Vec::with_capacity(header.len());
        for (idx, head) in header.iter().enumerate() {
            let name = match head {
                Data::Empty => format!("column_{}", idx),
                other => other.to_string().trim().to_string(),
            };
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Data::Empty))
                .collect();
            columns.push(Column::from(cells_to_series(&name, &cells)));
        }

        DataFrame::new(columns).map_err(|e| malformed(path, e))
    }
}

fn malformed(path: &Path, err: PolarsError) -> PipelineError {
    PipelineError::MalformedInput {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Convert one worksheet column into a typed Series.
///
/// All-numeric columns become `Int64` when every value is integral and
/// `Float64` otherwise; anything else becomes `String`. Empty cells, blank
/// strings and cell errors become null.
fn cells_to_series(name: &str, cells: &[&Data]) -> Series {
    let is_numeric = cells
        .iter()
        .all(|c| matches!(c, Data::Int(_) | Data::Float(_) | Data::Empty) || is_blank(c));

    if is_numeric {
        let floats: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(i) => Some(*i as f64),
                Data::Float(f) => Some(*f),
                _ => None,
            })
            .collect();

        if floats.iter().flatten().all(|f| f.fract() == 0.0) {
            let ints: Vec<Option<i64>> = floats.iter().map(|v| v.map(|f| f as i64)).collect();
            return Series::new(name.into(), ints);
        }
        return Series::new(name.into(), floats);
    }

    let strings: Vec<Option<String>> = cells
        .iter()
        .map(|c| match c {
            Data::Empty => None,
            Data::Error(e) => {
                warn!("Cell error in column '{}': {:?}", name, e);
                None
            }
            Data::String(s) if s.trim().is_empty() => None,
            Data::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect();
    Series::new(name.into(), strings)
}

fn is_blank(cell: &Data) -> bool {
    matches!(cell, Data::String(s) if s.trim().is_empty())
}
