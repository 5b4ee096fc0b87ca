#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod field;
pub mod loader;
pub mod record;
pub mod resolver;

pub use cell::Cell;
pub use error::{DataError, Result};
pub use field::Field;
pub use loader::{ScreenTable, load_csv, load_csv_bytes, table_from_frame};
pub use record::{Identity, PriceChanges, RawEstimates, StockRecord, sector_key};
pub use resolver::{ColumnMap, ColumnResolver};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
