//! Writing reports into an output directory.

use crate::export::{ExportError, ExportFormat, Exporter};
use crate::workbook::HighlightedTable;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes named reports into one directory in a fixed format.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    format: ExportFormat,
}

impl ReportWriter {
    /// Create a writer, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>, format: ExportFormat) -> Result<Self, ExportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, format })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Format of tabular reports.
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Path of a tabular report named `stem`.
    pub fn table_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.{}", self.format.extension()))
    }

    /// Write a tabular report and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_table<E: Exporter + ?Sized>(
        &self,
        stem: &str,
        report: &E,
    ) -> Result<PathBuf, ExportError> {
        let path = self.table_path(stem);
        report.export_to_file(&path, self.format)?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Write a highlighted workbook and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_workbook(
        &self,
        stem: &str,
        table: &HighlightedTable,
    ) -> Result<PathBuf, ExportError> {
        let path = self.dir.join(format!("{stem}.xlsx"));
        table.save(&path)?;
        info!(path = %path.display(), "workbook written");
        Ok(path)
    }
}
