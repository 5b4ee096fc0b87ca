//! Presentation flags for report cells.
//!
//! Flags never filter rows. They only decide cell colours in the
//! spreadsheet reports.

use crate::sector::SectorSummary;
use screener_metrics::Metric;
use screener_output::Highlight;

/// Flags of one numeric cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellFlags {
    /// Value is strictly greater than the reference average
    pub above_average: bool,
    /// Value equals the column minimum
    pub column_minimum: bool,
}

impl CellFlags {
    /// Cell colour; above-average wins over column minimum.
    pub const fn highlight(&self) -> Highlight {
        if self.above_average {
            Highlight::AboveAverage
        } else if self.column_minimum {
            Highlight::ColumnMinimum
        } else {
            Highlight::None
        }
    }
}

/// Minimum of a column, `None` when empty.
pub fn column_min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Arithmetic mean of a column, `None` when empty.
pub fn column_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Flags of each value against an average and the column's own minimum.
pub fn column_flags(values: &[f64], average: f64) -> Vec<CellFlags> {
    let min = column_min(values);
    values
        .iter()
        .map(|&value| CellFlags {
            above_average: value > average,
            column_minimum: Some(value) == min,
        })
        .collect()
}

/// Flags of the sector averages table, per row and metric.
///
/// Each metric column is compared with its own mean and minimum.
pub fn sector_flags(summaries: &[SectorSummary]) -> Vec<[CellFlags; 3]> {
    let mut flags = vec![[CellFlags::default(); 3]; summaries.len()];
    for metric in Metric::ALL {
        let values: Vec<f64> = summaries.iter().map(|s| s.mean(metric)).collect();
        let Some(mean) = column_mean(&values) else {
            continue;
        };
        for (row, cell) in flags.iter_mut().zip(column_flags(&values, mean)) {
            row[metric.index()] = cell;
        }
    }
    flags
}
