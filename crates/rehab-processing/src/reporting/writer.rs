//! CSV output of the cleaned table.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes the final table as CSV with a header row and no index column.
pub struct CsvTableWriter;

impl CsvTableWriter {
    /// Write `df` to `path`.
    ///
    /// The table is written to a hidden sibling file first and renamed into
    /// place, so `path` is either the complete table or untouched.
    pub fn write(df: &mut DataFrame, path: &Path) -> Result<()> {
        let write_failed = |reason: String| PipelineError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }

        let tmp_path = Self::temp_path(path);
        debug!("Writing {} rows to {}", df.height(), tmp_path.display());

        let written = Self::write_csv(df, &tmp_path)
            .and_then(|()| fs::rename(&tmp_path, path).map_err(PipelineError::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_failed(e.to_string()));
        }

        info!("Cleaned data saved: {}", path.display());
        Ok(())
    }

    fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)?;
        Ok(())
    }

    fn temp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.csv".to_string());
        path.with_file_name(format!(".{}.tmp", name))
    }
}
