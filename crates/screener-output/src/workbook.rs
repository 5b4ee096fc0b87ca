//! Highlighted spreadsheet output.

use crate::export::ExportError;
use rust_xlsxwriter::{Color, Format, Workbook};
use std::path::Path;

/// Longest worksheet name Excel accepts.
const MAX_SHEET_NAME: usize = 31;

/// Background highlight of a numeric cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Highlight {
    /// No background
    #[default]
    None,
    /// Value above the column or sector average, green
    AboveAverage,
    /// Value equal to the column minimum, red
    ColumnMinimum,
}

impl Highlight {
    /// Background colour, if any.
    pub const fn color(&self) -> Option<Color> {
        match self {
            Self::None => None,
            Self::AboveAverage => Some(Color::Green),
            Self::ColumnMinimum => Some(Color::Red),
        }
    }
}

/// A cell of a highlighted table.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    /// Text
    Text(String),
    /// Number with optional highlight
    Number(f64, Highlight),
    /// Blank cell
    Empty,
}

impl SheetCell {
    /// Highlight of the cell, `None` for non-numeric cells.
    pub const fn highlight(&self) -> Highlight {
        match self {
            Self::Number(_, highlight) => *highlight,
            Self::Text(_) | Self::Empty => Highlight::None,
        }
    }
}

/// A single-sheet table with per-cell highlighting.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedTable {
    /// Worksheet name
    pub sheet_name: String,
    /// Header row
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<Vec<SheetCell>>,
}

impl HighlightedTable {
    /// Create an empty table.
    pub fn new<S: Into<String>>(sheet_name: impl Into<String>, headers: Vec<S>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row.
    pub fn push_row(&mut self, row: Vec<SheetCell>) {
        self.rows.push(row);
    }

    /// Number of cells with the given highlight.
    pub fn count(&self, highlight: Highlight) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.highlight() == highlight)
            .count()
    }

    /// Render the table into a workbook.
    ///
    /// # Errors
    ///
    /// Returns an error if the table exceeds worksheet limits.
    pub fn to_workbook(&self) -> Result<Workbook, ExportError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&self.sheet_name))?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, column(col)?, header, &bold)?;
        }

        for (i, row) in self.rows.iter().enumerate() {
            let r = u32::try_from(i + 1)
                .map_err(|_| ExportError::InvalidFormat(format!("row {i} out of range")))?;
            for (col, cell) in row.iter().enumerate() {
                let c = column(col)?;
                match cell {
                    SheetCell::Text(text) => {
                        worksheet.write_string(r, c, text)?;
                    }
                    SheetCell::Number(value, highlight) => match fill(*highlight) {
                        Some(format) => {
                            worksheet.write_number_with_format(r, c, *value, &format)?;
                        }
                        None => {
                            worksheet.write_number(r, c, *value)?;
                        }
                    },
                    SheetCell::Empty => {}
                }
            }
        }

        Ok(workbook)
    }

    /// Write the table to an `.xlsx` file.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let mut workbook = self.to_workbook()?;
        workbook.save(path)?;
        Ok(())
    }
}

/// Background format of a highlighted cell.
fn fill(highlight: Highlight) -> Option<Format> {
    highlight
        .color()
        .map(|color| Format::new().set_background_color(color))
}

fn column(index: usize) -> Result<u16, ExportError> {
    u16::try_from(index)
        .map_err(|_| ExportError::InvalidFormat(format!("column {index} out of range")))
}

/// Replace characters Excel rejects in sheet names and truncate.
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}
