//! Report tables and files of a run.

use crate::config::ScreenConfig;
use crate::error::Result;
use crate::highlight::sector_flags;
use crate::pipeline::ScreenResult;
use crate::ranking::RankedStock;
use crate::sector::SectorSummary;
use screener_metrics::{EvaluatedStock, Metric};
use screener_output::{
    ExportRow, ExtremeExport, Highlight, HighlightedTable, RankedExport, ReportWriter,
    SectorExport, SheetCell, StockExport,
};
use std::path::PathBuf;

/// Stocks surviving every filter.
pub const FILTERED_STOCKS: &str = "filtered_stock_data";
/// Stocks with a metric equal to 99.
pub const STOCKS_99: &str = "stocks_99";
/// Stocks with a metric equal to -99.
pub const STOCKS_NEG99: &str = "stocks_neg99";
/// Stocks with a metric equal to -100.
pub const STOCKS_NEG100: &str = "stocks_neg100";
/// Stocks removed by the z-score pass.
pub const EXTREME_STOCKS: &str = "extreme_valued_stocks";
/// Per-sector means.
pub const SECTOR_AVERAGES: &str = "sector_averages";
/// Per-sector means with highlighting.
pub const SECTOR_AVERAGES_COLORED: &str = "sector_averages_colored";

/// Stock rows with composite and momentum scores.
pub fn stock_rows(stocks: &[EvaluatedStock], config: &ScreenConfig) -> Vec<StockExport> {
    stocks
        .iter()
        .map(|stock| {
            StockExport::from_stock(stock).with_scores(
                Some(config.weights.score(stock)),
                stock.momentum(&config.momentum),
            )
        })
        .collect()
}

/// Sector averages rows.
pub fn sector_rows(sectors: &[SectorSummary]) -> Vec<SectorExport> {
    sectors.iter().map(SectorSummary::to_export).collect()
}

/// Ranking rows.
pub fn ranked_rows(ranked: &[RankedStock]) -> Vec<RankedExport> {
    ranked.iter().map(RankedStock::to_export).collect()
}

/// Sector averages with above-average cells green and column minimums red.
pub fn sector_table(sectors: &[SectorSummary]) -> HighlightedTable {
    let mut table = HighlightedTable::new("Sector Averages", SectorExport::HEADERS.to_vec());
    for (summary, flags) in sectors.iter().zip(sector_flags(sectors)) {
        let mut row = vec![SheetCell::Text(summary.sector.clone())];
        for metric in Metric::ALL {
            row.push(SheetCell::Number(
                summary.mean(metric),
                flags[metric.index()].highlight(),
            ));
        }
        row.push(SheetCell::Number(summary.count as f64, Highlight::None));
        table.push_row(row);
    }
    table
}

/// Ranking with flagged metric cells.
pub fn ranked_table(sector: &str, ranked: &[RankedStock]) -> HighlightedTable {
    let mut table = HighlightedTable::new(sector, RankedExport::HEADERS.to_vec());
    for entry in ranked {
        let identity = &entry.stock.identity;
        let mut row = vec![
            SheetCell::Number(entry.rank as f64, Highlight::None),
            SheetCell::Text(identity.ticker.clone()),
            SheetCell::Text(identity.company_name.clone()),
            SheetCell::Text(identity.sector.clone()),
            SheetCell::Text(identity.industry.clone()),
        ];
        for metric in Metric::ALL {
            row.push(SheetCell::Number(
                entry.stock.value(metric),
                entry.flags(metric).highlight(),
            ));
        }
        row.push(SheetCell::Number(entry.score, Highlight::None));
        table.push_row(row);
    }
    table
}

/// File stem of a sector ranking, e.g. `top_stocks_computer_and_technology`.
pub fn ranked_file_stem(sector: &str) -> String {
    let mut slug = String::new();
    for c in sector.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "top_stocks".to_string()
    } else {
        format!("top_stocks_{slug}")
    }
}

/// Write every report of a run.
///
/// # Errors
///
/// Returns an error if a report cannot be written.
pub fn write_screen_reports(
    result: &ScreenResult,
    config: &ScreenConfig,
    writer: &ReportWriter,
) -> Result<Vec<PathBuf>> {
    let outliers = &result.outliers;
    let extreme: Vec<ExtremeExport> = outliers.extreme.iter().map(ExtremeExport::from).collect();

    Ok(vec![
        writer.write_table(FILTERED_STOCKS, &stock_rows(&outliers.retained, config))?,
        writer.write_table(STOCKS_99, &stock_rows(&outliers.flagged_99, config))?,
        writer.write_table(STOCKS_NEG99, &stock_rows(&outliers.flagged_neg99, config))?,
        writer.write_table(STOCKS_NEG100, &stock_rows(&outliers.flagged_neg100, config))?,
        writer.write_table(EXTREME_STOCKS, &extreme)?,
        writer.write_table(SECTOR_AVERAGES, &sector_rows(&result.sectors))?,
        writer.write_workbook(SECTOR_AVERAGES_COLORED, &sector_table(&result.sectors))?,
    ])
}

/// Write a sector ranking as a table and a highlighted workbook.
///
/// # Errors
///
/// Returns an error if a report cannot be written.
pub fn write_ranked_reports(
    sector: &str,
    ranked: &[RankedStock],
    writer: &ReportWriter,
) -> Result<Vec<PathBuf>> {
    let stem = ranked_file_stem(sector);
    Ok(vec![
        writer.write_table(&stem, &ranked_rows(ranked))?,
        writer.write_workbook(&stem, &ranked_table(sector, ranked))?,
    ])
}
