//! Tabular export of screener reports.
//!
//! Each report is a list of flat row structs whose serde names are the
//! column headers of the written file. CSV output always carries a header
//! row, so an empty report is still a valid table.

use screener_metrics::{EvaluatedStock, ExtremeStock, Metric};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet error.
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// A row type of an exported table.
pub trait ExportRow: Serialize {
    /// Column headers, in serialization order.
    const HEADERS: &'static [&'static str];
}

impl<T: ExportRow> Exporter for Vec<T> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => rows_to_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

fn rows_to_csv<T: ExportRow>(rows: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if rows.is_empty() {
        wtr.write_record(T::HEADERS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// A stock row with its inputs and metrics.
///
/// Used for `filtered_stock_data` and the sentinel reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockExport {
    /// Company name.
    #[serde(rename = "Company Name")]
    pub company_name: String,

    /// Ticker symbol.
    #[serde(rename = "Ticker")]
    pub ticker: String,

    /// Market capitalization in millions.
    #[serde(rename = "Market Cap (mil)")]
    pub market_cap: Option<f64>,

    /// Sector.
    #[serde(rename = "Sector")]
    pub sector: String,

    /// Industry.
    #[serde(rename = "Industry")]
    pub industry: String,

    /// Exchange.
    #[serde(rename = "Exchange")]
    pub exchange: String,

    /// Month of fiscal year end.
    #[serde(rename = "Month of Fiscal Yr End")]
    pub fiscal_year_end: String,

    /// F0 EPS consensus.
    #[serde(rename = "F0 Consensus Est.")]
    pub f0: f64,

    /// F1 EPS consensus.
    #[serde(rename = "F1 Consensus Est.")]
    pub f1: f64,

    /// F2 EPS consensus.
    #[serde(rename = "F2 Consensus Est.")]
    pub f2: f64,

    /// Annual sales in millions.
    #[serde(rename = "Annual Sales ($mil)")]
    pub annual_sales: f64,

    /// Next fiscal year sales consensus in millions.
    #[serde(rename = "F(1) Consensus Sales Est. ($mil)")]
    pub f1_sales_estimate: f64,

    /// Sales growth F1.
    #[serde(rename = "SG-F1")]
    pub sales_growth_f1: f64,

    /// Earnings growth F1.
    #[serde(rename = "EG-F1")]
    pub earnings_growth_f1: f64,

    /// Earnings growth F2.
    #[serde(rename = "EG-F2")]
    pub earnings_growth_f2: f64,

    /// Weighted composite of the three metrics.
    #[serde(rename = "Composite Score")]
    pub composite_score: Option<f64>,

    /// Weighted price momentum.
    #[serde(rename = "Momentum Score")]
    pub momentum_score: Option<f64>,
}

impl StockExport {
    /// Build a row from an evaluated stock, without scores.
    pub fn from_stock(stock: &EvaluatedStock) -> Self {
        let identity = &stock.identity;
        Self {
            company_name: identity.company_name.clone(),
            ticker: identity.ticker.clone(),
            market_cap: identity.market_cap,
            sector: identity.sector.clone(),
            industry: identity.industry.clone(),
            exchange: identity.exchange.clone(),
            fiscal_year_end: identity.fiscal_year_end.clone(),
            f0: stock.estimates.f0,
            f1: stock.estimates.f1,
            f2: stock.estimates.f2,
            annual_sales: stock.estimates.annual_sales,
            f1_sales_estimate: stock.estimates.f1_sales_estimate,
            sales_growth_f1: stock.value(Metric::SalesGrowthF1),
            earnings_growth_f1: stock.value(Metric::EarningsGrowthF1),
            earnings_growth_f2: stock.value(Metric::EarningsGrowthF2),
            composite_score: None,
            momentum_score: None,
        }
    }

    /// Attach composite and momentum scores.
    pub const fn with_scores(mut self, composite: Option<f64>, momentum: Option<f64>) -> Self {
        self.composite_score = composite;
        self.momentum_score = momentum;
        self
    }
}

impl ExportRow for StockExport {
    const HEADERS: &'static [&'static str] = &[
        "Company Name",
        "Ticker",
        "Market Cap (mil)",
        "Sector",
        "Industry",
        "Exchange",
        "Month of Fiscal Yr End",
        "F0 Consensus Est.",
        "F1 Consensus Est.",
        "F2 Consensus Est.",
        "Annual Sales ($mil)",
        "F(1) Consensus Sales Est. ($mil)",
        "SG-F1",
        "EG-F1",
        "EG-F2",
        "Composite Score",
        "Momentum Score",
    ];
}

/// A row removed by the z-score pass, with its z-scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtremeExport {
    /// Ticker symbol.
    #[serde(rename = "Ticker")]
    pub ticker: String,

    /// Company name.
    #[serde(rename = "Company Name")]
    pub company_name: String,

    /// Sector.
    #[serde(rename = "Sector")]
    pub sector: String,

    /// Sales growth F1.
    #[serde(rename = "SG-F1")]
    pub sales_growth_f1: f64,

    /// Earnings growth F1.
    #[serde(rename = "EG-F1")]
    pub earnings_growth_f1: f64,

    /// Earnings growth F2.
    #[serde(rename = "EG-F2")]
    pub earnings_growth_f2: f64,

    /// Robust z-score of SG-F1, empty when skipped.
    #[serde(rename = "SG-F1 Z")]
    pub sales_growth_f1_z: Option<f64>,

    /// Robust z-score of EG-F1, empty when skipped.
    #[serde(rename = "EG-F1 Z")]
    pub earnings_growth_f1_z: Option<f64>,

    /// Robust z-score of EG-F2, empty when skipped.
    #[serde(rename = "EG-F2 Z")]
    pub earnings_growth_f2_z: Option<f64>,
}

impl From<&ExtremeStock> for ExtremeExport {
    fn from(extreme: &ExtremeStock) -> Self {
        let stock = &extreme.stock;
        Self {
            ticker: stock.identity.ticker.clone(),
            company_name: stock.identity.company_name.clone(),
            sector: stock.identity.sector.clone(),
            sales_growth_f1: stock.value(Metric::SalesGrowthF1),
            earnings_growth_f1: stock.value(Metric::EarningsGrowthF1),
            earnings_growth_f2: stock.value(Metric::EarningsGrowthF2),
            sales_growth_f1_z: extreme.z_scores.get(Metric::SalesGrowthF1),
            earnings_growth_f1_z: extreme.z_scores.get(Metric::EarningsGrowthF1),
            earnings_growth_f2_z: extreme.z_scores.get(Metric::EarningsGrowthF2),
        }
    }
}

impl ExportRow for ExtremeExport {
    const HEADERS: &'static [&'static str] = &[
        "Ticker",
        "Company Name",
        "Sector",
        "SG-F1",
        "EG-F1",
        "EG-F2",
        "SG-F1 Z",
        "EG-F1 Z",
        "EG-F2 Z",
    ];
}

/// Per-sector metric means.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorExport {
    /// Sector name.
    #[serde(rename = "Sector")]
    pub sector: String,

    /// Mean SG-F1.
    #[serde(rename = "SG-F1")]
    pub sales_growth_f1: f64,

    /// Mean EG-F1.
    #[serde(rename = "EG-F1")]
    pub earnings_growth_f1: f64,

    /// Mean EG-F2.
    #[serde(rename = "EG-F2")]
    pub earnings_growth_f2: f64,

    /// Number of stocks in the sector.
    #[serde(rename = "Stocks Count")]
    pub stocks_count: usize,
}

impl SectorExport {
    /// Create a sector row from means in [`Metric::ALL`] order.
    pub const fn new(sector: String, means: [f64; 3], stocks_count: usize) -> Self {
        Self {
            sector,
            sales_growth_f1: means[0],
            earnings_growth_f1: means[1],
            earnings_growth_f2: means[2],
            stocks_count,
        }
    }
}

impl ExportRow for SectorExport {
    const HEADERS: &'static [&'static str] =
        &["Sector", "SG-F1", "EG-F1", "EG-F2", "Stocks Count"];
}

/// A ranked stock of a top-performers report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedExport {
    /// 1-based rank.
    #[serde(rename = "Rank")]
    pub rank: usize,

    /// Ticker symbol.
    #[serde(rename = "Ticker")]
    pub ticker: String,

    /// Company name.
    #[serde(rename = "Company Name")]
    pub company_name: String,

    /// Sector.
    #[serde(rename = "Sector")]
    pub sector: String,

    /// Industry.
    #[serde(rename = "Industry")]
    pub industry: String,

    /// Sales growth F1.
    #[serde(rename = "SG-F1")]
    pub sales_growth_f1: f64,

    /// Earnings growth F1.
    #[serde(rename = "EG-F1")]
    pub earnings_growth_f1: f64,

    /// Earnings growth F2.
    #[serde(rename = "EG-F2")]
    pub earnings_growth_f2: f64,

    /// Ranking score.
    #[serde(rename = "Score")]
    pub score: f64,
}

impl RankedExport {
    /// Create a ranked row.
    pub fn new(rank: usize, stock: &EvaluatedStock, score: f64) -> Self {
        Self {
            rank,
            ticker: stock.identity.ticker.clone(),
            company_name: stock.identity.company_name.clone(),
            sector: stock.identity.sector.clone(),
            industry: stock.identity.industry.clone(),
            sales_growth_f1: stock.value(Metric::SalesGrowthF1),
            earnings_growth_f1: stock.value(Metric::EarningsGrowthF1),
            earnings_growth_f2: stock.value(Metric::EarningsGrowthF2),
            score,
        }
    }
}

impl ExportRow for RankedExport {
    const HEADERS: &'static [&'static str] = &[
        "Rank",
        "Ticker",
        "Company Name",
        "Sector",
        "Industry",
        "SG-F1",
        "EG-F1",
        "EG-F2",
        "Score",
    ];
}
