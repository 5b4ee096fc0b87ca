//! Run summary.
//!
//! Counts of rows read, rows excluded per reason and rows written to each
//! report, as printed at the end of a `process` run.

use crate::export::{ExportError, ExportFormat, Exporter};
use chrono::{DateTime, Utc};
use screener_metrics::ExclusionKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-run counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Input source name.
    pub source: String,

    /// When the run finished.
    pub generated_at: DateTime<Utc>,

    /// Data rows read.
    pub rows_read: usize,

    /// Rows dropped by the exchange allow-list.
    pub excluded_exchange: usize,

    /// Rows with an empty required input.
    pub excluded_missing_value: usize,

    /// Rows with a non-numeric required input.
    pub excluded_not_numeric: usize,

    /// Rows with a zero denominator.
    pub excluded_division_by_zero: usize,

    /// Rows whose metrics overflowed.
    pub excluded_non_finite: usize,

    /// Rows in `filtered_stock_data`.
    pub filtered: usize,

    /// Rows in `stocks_99`.
    pub flagged_99: usize,

    /// Rows in `stocks_neg99`.
    pub flagged_neg99: usize,

    /// Rows in `stocks_neg100`.
    pub flagged_neg100: usize,

    /// Rows in `extreme_valued_stocks`.
    pub extreme: usize,

    /// Sectors in `sector_averages`.
    pub sectors: usize,

    /// Metrics (and sectors) whose z-score filter was skipped.
    pub undefined_dispersion: Vec<String>,
}

impl RunSummary {
    /// Create an empty summary for a source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            generated_at: Utc::now(),
            rows_read: 0,
            excluded_exchange: 0,
            excluded_missing_value: 0,
            excluded_not_numeric: 0,
            excluded_division_by_zero: 0,
            excluded_non_finite: 0,
            filtered: 0,
            flagged_99: 0,
            flagged_neg99: 0,
            flagged_neg100: 0,
            extreme: 0,
            sectors: 0,
            undefined_dispersion: Vec::new(),
        }
    }

    /// Count one validity exclusion.
    pub const fn record_exclusion(&mut self, kind: ExclusionKind) {
        match kind {
            ExclusionKind::MissingValue => self.excluded_missing_value += 1,
            ExclusionKind::NotNumeric => self.excluded_not_numeric += 1,
            ExclusionKind::DivisionByZero => self.excluded_division_by_zero += 1,
            ExclusionKind::NonFinite => self.excluded_non_finite += 1,
        }
    }

    /// Validity exclusions of one kind.
    pub const fn excluded(&self, kind: ExclusionKind) -> usize {
        match kind {
            ExclusionKind::MissingValue => self.excluded_missing_value,
            ExclusionKind::NotNumeric => self.excluded_not_numeric,
            ExclusionKind::DivisionByZero => self.excluded_division_by_zero,
            ExclusionKind::NonFinite => self.excluded_non_finite,
        }
    }

    /// Rows excluded before the outlier filter.
    pub const fn excluded_total(&self) -> usize {
        self.excluded_exchange
            + self.excluded_missing_value
            + self.excluded_not_numeric
            + self.excluded_division_by_zero
            + self.excluded_non_finite
    }

    /// Rows that reached the outlier filter.
    pub const fn validated(&self) -> usize {
        self.filtered + self.flagged_99 + self.flagged_neg99 + self.flagged_neg100 + self.extreme
    }

    fn entries(&self) -> Vec<(String, usize)> {
        let mut entries = vec![
            ("Rows read".to_string(), self.rows_read),
            ("Excluded: exchange".to_string(), self.excluded_exchange),
        ];
        for kind in ExclusionKind::ALL {
            entries.push((format!("Excluded: {kind}"), self.excluded(kind)));
        }
        entries.extend([
            ("filtered_stock_data".to_string(), self.filtered),
            ("stocks_99".to_string(), self.flagged_99),
            ("stocks_neg99".to_string(), self.flagged_neg99),
            ("stocks_neg100".to_string(), self.flagged_neg100),
            ("extreme_valued_stocks".to_string(), self.extreme),
            ("sector_averages".to_string(), self.sectors),
        ]);
        entries
    }

    /// Format as a boxed ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nRun Summary: {}\n", self.source));
        output.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&"=".repeat(48));
        output.push('\n');

        for (label, count) in self.entries() {
            output.push_str(&format!("{label:<32} {count:>15}\n"));
        }

        if !self.undefined_dispersion.is_empty() {
            output.push_str(&"-".repeat(48));
            output.push('\n');
            output.push_str("Undefined dispersion (z-filter skipped):\n");
            for warning in &self.undefined_dispersion {
                output.push_str(&format!("  {warning}\n"));
            }
        }

        output.push_str(&"=".repeat(48));
        output.push('\n');
        output
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} read, {} excluded, {} filtered, {} flagged, {} extreme",
            self.source,
            self.rows_read,
            self.excluded_total(),
            self.filtered,
            self.flagged_99 + self.flagged_neg99 + self.flagged_neg100,
            self.extreme
        )
    }
}

/// Flattened summary entry for CSV export.
#[derive(Debug, Serialize)]
struct SummaryFlat {
    metric: String,
    value: usize,
}

impl Exporter for RunSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for (metric, value) in self.entries() {
                    wtr.serialize(SummaryFlat { metric, value })?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
