//! Top performers of a sector.
//!
//! The ranker takes the filtered stocks of one sector, applies the robust
//! z-score test once with the caller's tolerance, orders the survivors by
//! score and keeps the top percentage of them.

use crate::config::ScreenConfig;
use crate::error::Result;
use crate::highlight::{CellFlags, column_min};
use crate::sector::SectorSummary;
use screener_data::sector_key;
use screener_metrics::{EvaluatedStock, Metric, ZScoreFilter, ZScoreScope};
use screener_output::RankedExport;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Default z-score tolerance of a ranking request.
pub const DEFAULT_TOLERANCE: f64 = 3.0;

/// Default share of survivors kept, in percent.
pub const DEFAULT_TOP_PERCENT: f64 = 10.0;

/// Errors in a ranking request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    /// Percentage outside `(0, 100]`
    #[error("Invalid percentage {0}: must be in (0, 100]")]
    InvalidPercentage(f64),

    /// Tolerance not finite or not positive
    #[error("Invalid tolerance {0}: must be finite and positive")]
    InvalidTolerance(f64),

    /// No filtered stock in the sector
    #[error("Unknown sector: {0}")]
    UnknownSector(String),

    /// Unrecognised ranking metric name
    #[error("Unknown ranking metric: {0}")]
    UnknownMetric(String),
}

/// Value stocks are ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankMetric {
    /// Weighted composite of the three growth metrics
    #[default]
    Composite,
    /// SG-F1 alone
    SalesGrowthF1,
    /// EG-F1 alone
    EarningsGrowthF1,
    /// EG-F2 alone
    EarningsGrowthF2,
    /// Weighted price momentum
    Momentum,
}

impl RankMetric {
    /// All ranking metrics.
    pub const ALL: [Self; 5] = [
        Self::Composite,
        Self::SalesGrowthF1,
        Self::EarningsGrowthF1,
        Self::EarningsGrowthF2,
        Self::Momentum,
    ];

    /// Command-line name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Composite => "composite",
            Self::SalesGrowthF1 => "sg-f1",
            Self::EarningsGrowthF1 => "eg-f1",
            Self::EarningsGrowthF2 => "eg-f2",
            Self::Momentum => "momentum",
        }
    }

    /// Score of a stock, `None` when the stock lacks the inputs.
    pub fn score(&self, stock: &EvaluatedStock, config: &ScreenConfig) -> Option<f64> {
        match self {
            Self::Composite => Some(config.weights.score(stock)),
            Self::SalesGrowthF1 => Some(stock.value(Metric::SalesGrowthF1)),
            Self::EarningsGrowthF1 => Some(stock.value(Metric::EarningsGrowthF1)),
            Self::EarningsGrowthF2 => Some(stock.value(Metric::EarningsGrowthF2)),
            Self::Momentum => stock.momentum(&config.momentum),
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RankMetric {
    type Err = RankError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RankError::UnknownMetric(s.to_string()))
    }
}

/// A ranking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    /// Target sector
    pub sector: String,
    /// Z-score tolerance (default: 3.0)
    pub tolerance: f64,
    /// Share of survivors kept, in percent (default: 10)
    pub top_percent: f64,
    /// Ordering value (default: composite)
    pub metric: RankMetric,
}

impl RankRequest {
    /// Request with default tolerance, percentage and metric.
    pub fn new(sector: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            tolerance: DEFAULT_TOLERANCE,
            top_percent: DEFAULT_TOP_PERCENT,
            metric: RankMetric::Composite,
        }
    }

    /// Set the z-score tolerance.
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the kept percentage.
    pub const fn with_top_percent(mut self, top_percent: f64) -> Self {
        self.top_percent = top_percent;
        self
    }

    /// Set the ordering value.
    pub const fn with_metric(mut self, metric: RankMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Check tolerance and percentage.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidTolerance`] or [`RankError::InvalidPercentage`].
    pub fn validate(&self) -> std::result::Result<(), RankError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RankError::InvalidTolerance(self.tolerance));
        }
        if !(self.top_percent > 0.0 && self.top_percent <= 100.0) {
            return Err(RankError::InvalidPercentage(self.top_percent));
        }
        Ok(())
    }
}

/// Number of rows kept out of `count` for a percentage in `(0, 100]`.
///
/// At least one row is kept whenever `count` is non-zero.
pub fn top_count(count: usize, top_percent: f64) -> usize {
    if count == 0 {
        return 0;
    }
    let share = top_percent * count as f64 / 100.0;
    // Float residue must not round an exact product up.
    let kept = (share - 1e-9).ceil() as usize;
    kept.clamp(1, count)
}

/// A stock in a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedStock {
    /// The stock
    pub stock: EvaluatedStock,
    /// Ranking score
    pub score: f64,
    /// 1-based rank
    pub rank: usize,
    /// Cell flags in [`Metric::ALL`] order
    pub flags: [CellFlags; 3],
}

impl RankedStock {
    /// Flags of one metric cell.
    pub const fn flags(&self, metric: Metric) -> CellFlags {
        self.flags[metric.index()]
    }

    /// Report row.
    pub fn to_export(&self) -> RankedExport {
        RankedExport::new(self.rank, &self.stock, self.score)
    }
}

/// Ranks the stocks of a sector.
#[derive(Debug, Clone)]
pub struct Ranker<'a> {
    config: &'a ScreenConfig,
}

impl<'a> Ranker<'a> {
    /// Create a ranker using the configuration's weights and consistency constant.
    pub const fn new(config: &'a ScreenConfig) -> Self {
        Self { config }
    }

    /// Rank `filtered` stocks of the requested sector.
    ///
    /// `sectors` supplies the sector averages used for the above-average
    /// flags; when the sector is absent its mean is taken from its members.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid request, a sector with no filtered
    /// stock or a failed z-score computation.
    pub fn rank(
        &self,
        filtered: &[EvaluatedStock],
        sectors: &[SectorSummary],
        request: &RankRequest,
    ) -> Result<Vec<RankedStock>> {
        request.validate()?;

        let target = sector_key(&request.sector);
        let members: Vec<EvaluatedStock> = filtered
            .iter()
            .filter(|s| s.identity.sector_key() == target)
            .cloned()
            .collect();
        if members.is_empty() {
            return Err(RankError::UnknownSector(request.sector.clone()).into());
        }

        let means = sectors
            .iter()
            .find(|s| s.matches(&target))
            .map_or_else(|| member_means(&members), |s| s.means);

        let outcome = ZScoreFilter::new(
            request.tolerance,
            self.config.outlier.consistency_constant,
            ZScoreScope::Universe,
        )
        .with_max_passes(1)
        .apply(members)?;
        debug!(
            removed = outcome.extreme.len(),
            tolerance = request.tolerance,
            "tolerance filter applied"
        );

        let mut scored: Vec<(EvaluatedStock, f64)> = Vec::with_capacity(outcome.retained.len());
        for stock in outcome.retained {
            match request.metric.score(&stock, self.config) {
                Some(score) => scored.push((stock, score)),
                None => info!(
                    ticker = stock.ticker(),
                    metric = %request.metric,
                    "stock skipped, no score"
                ),
            }
        }

        scored.sort_by(|(a, sa), (b, sb)| {
            by_score_then_ticker((a.ticker(), *sa), (b.ticker(), *sb))
        });
        scored.truncate(top_count(scored.len(), request.top_percent));

        let minimums: [Option<f64>; 3] = Metric::ALL.map(|metric| {
            let values: Vec<f64> = scored.iter().map(|(s, _)| s.value(metric)).collect();
            column_min(&values)
        });

        let ranked: Vec<RankedStock> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (stock, score))| {
                let flags = Metric::ALL.map(|metric| {
                    let value = stock.value(metric);
                    CellFlags {
                        above_average: value > means[metric.index()],
                        column_minimum: minimums[metric.index()] == Some(value),
                    }
                });
                RankedStock {
                    stock,
                    score,
                    rank: i + 1,
                    flags,
                }
            })
            .collect();

        info!(
            sector = %request.sector,
            metric = %request.metric,
            ranked = ranked.len(),
            "sector ranked"
        );
        Ok(ranked)
    }
}

fn member_means(members: &[EvaluatedStock]) -> [f64; 3] {
    let n = members.len() as f64;
    Metric::ALL.map(|metric| members.iter().map(|s| s.value(metric)).sum::<f64>() / n)
}

fn by_score_then_ticker(a: (&str, f64), b: (&str, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0))
}
