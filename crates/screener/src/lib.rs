#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod highlight;
pub mod pipeline;
pub mod ranking;
pub mod reports;
pub mod sector;

// Re-export main types from sub-crates
pub use screener_data as data;
pub use screener_metrics as metrics;
pub use screener_output as output;

pub use config::{CompositeWeights, ConfigError, ScreenConfig};
pub use error::{Result, ScreenError};
pub use highlight::CellFlags;
pub use pipeline::{Pipeline, ScreenResult};
pub use ranking::{RankError, RankMetric, RankRequest, RankedStock, Ranker};
pub use reports::{write_ranked_reports, write_screen_reports};
pub use sector::{SectorAggregator, SectorSummary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
