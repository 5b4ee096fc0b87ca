#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;
pub mod workbook;

pub use export::{
    ExportError, ExportFormat, ExportRow, Exporter, ExtremeExport, RankedExport, SectorExport,
    StockExport,
};
pub use report::ReportWriter;
pub use summary::RunSummary;
pub use workbook::{Highlight, HighlightedTable, SheetCell};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
