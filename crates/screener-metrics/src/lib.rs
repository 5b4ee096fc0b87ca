#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod growth;
pub mod metric;
pub mod momentum;
pub mod outlier;
pub mod stats;
pub mod validity;

pub use error::{ExclusionKind, ExclusionReason};
pub use growth::{Estimates, Growth, GrowthMetrics, earnings_growth, sales_growth};
pub use metric::Metric;
pub use momentum::MomentumWeights;
pub use outlier::{
    DispersionWarning, ExtremeStock, OutlierConfig, OutlierFilter, OutlierReport, Sentinel,
    ZScoreFilter, ZScoreOutcome, ZScoreScope, ZScores,
};
pub use frame::metrics_frame;
pub use stats::CONSISTENCY_CONSTANT;
pub use validity::{EvaluatedStock, Rejection, ValidityOutcome, validate};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
