//! Outlier filtering.
//!
//! Two passes run in sequence over validated rows:
//!
//! 1. Sentinel exclusion removes rows where any metric equals one of the flag
//!    values `99`, `-99` or `-100`. Each removed row is assigned to exactly one
//!    sentinel report, checked in that order.
//! 2. Robust z-score exclusion removes rows whose `0.6745 * (x - median) / IQR`
//!    exceeds the threshold in absolute value for any metric. A metric with
//!    zero IQR is skipped. The pass is repeated on the survivors until nothing
//!    more is removed, so applying the filter to its own output is a no-op.
//!    [`ZScoreFilter::with_max_passes`] caps the repetitions.

use crate::frame::{SECTOR_KEY, metrics_frame};
use crate::metric::Metric;
use crate::stats::{CONSISTENCY_CONSTANT, iqr, robust_z};
use crate::validity::EvaluatedStock;
use polars::prelude::{IntoLazy, PolarsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Default absolute z-score above which a row is an outlier.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Flag values that stand in for an undefined growth ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentinel {
    /// 99
    High,
    /// -99
    Low,
    /// -100
    Floor,
}

impl Sentinel {
    /// All sentinels in assignment priority order.
    pub const ALL: [Self; 3] = [Self::High, Self::Low, Self::Floor];

    /// Flag value.
    pub const fn value(&self) -> f64 {
        match self {
            Self::High => 99.0,
            Self::Low => -99.0,
            Self::Floor => -100.0,
        }
    }

    /// Report name suffix (`99`, `neg99`, `neg100`).
    pub const fn label(&self) -> &'static str {
        match self {
            Self::High => "99",
            Self::Low => "neg99",
            Self::Floor => "neg100",
        }
    }

    /// First sentinel any of the values equals exactly.
    pub fn classify(values: &[f64]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| values.iter().any(|v| *v == s.value()))
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Population over which z-score statistics are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZScoreScope {
    /// All remaining rows together
    #[default]
    Universe,
    /// Each sector separately
    Sector,
}

/// Configuration for the outlier filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// Absolute z-score above which a row is removed (default: 3.0)
    pub z_threshold: f64,
    /// Scale applied to the IQR-normalised deviation (default: 0.6745)
    pub consistency_constant: f64,
    /// Population for the statistics (default: universe)
    pub scope: ZScoreScope,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
            consistency_constant: CONSISTENCY_CONSTANT,
            scope: ZScoreScope::Universe,
        }
    }
}

/// Per-metric robust z-scores of a row; `None` where the metric was skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZScores {
    values: [Option<f64>; 3],
}

impl ZScores {
    /// Z-score of one metric.
    pub const fn get(&self, metric: Metric) -> Option<f64> {
        self.values[metric.index()]
    }

    /// Whether any z-score exceeds `threshold` in absolute value.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.values.iter().flatten().any(|z| z.abs() > threshold)
    }
}

/// A row removed by the z-score pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeStock {
    /// The removed row
    pub stock: EvaluatedStock,
    /// Its z-scores in the pass that removed it
    pub z_scores: ZScores,
}

/// A metric whose IQR was zero, so z-filtering was skipped for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispersionWarning {
    /// Affected metric
    pub metric: Metric,
    /// Sector, for sector-scoped statistics
    pub sector: Option<String>,
}

impl fmt::Display for DispersionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sector {
            Some(sector) => write!(f, "{} has zero IQR in {sector}", self.metric),
            None => write!(f, "{} has zero IQR", self.metric),
        }
    }
}

/// Result of a z-score pass.
#[derive(Debug, Clone, Default)]
pub struct ZScoreOutcome {
    /// Rows within the threshold, in input order
    pub retained: Vec<EvaluatedStock>,
    /// Rows beyond the threshold, in input order
    pub extreme: Vec<ExtremeStock>,
    /// Metrics skipped for zero dispersion
    pub warnings: Vec<DispersionWarning>,
}

/// Robust z-score filter with a configurable threshold.
#[derive(Debug, Clone, Copy)]
pub struct ZScoreFilter {
    threshold: f64,
    consistency: f64,
    scope: ZScoreScope,
    max_passes: Option<usize>,
}

impl ZScoreFilter {
    /// Create a filter that repeats until nothing more is removed.
    pub const fn new(threshold: f64, consistency: f64, scope: ZScoreScope) -> Self {
        Self {
            threshold,
            consistency,
            scope,
            max_passes: None,
        }
    }

    /// Filter using the outlier configuration.
    pub const fn from_config(config: &OutlierConfig) -> Self {
        Self::new(
            config.z_threshold,
            config.consistency_constant,
            config.scope,
        )
    }

    /// Stop after at most `passes` passes.
    pub const fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = Some(passes);
        self
    }

    /// Split rows into retained and extreme.
    ///
    /// # Errors
    ///
    /// Returns an error if the statistics cannot be computed.
    pub fn apply(&self, stocks: Vec<EvaluatedStock>) -> PolarsResult<ZScoreOutcome> {
        let partition = match self.scope {
            ZScoreScope::Universe => None,
            ZScoreScope::Sector => Some(SECTOR_KEY),
        };

        let mut removed: Vec<Option<ZScores>> = vec![None; stocks.len()];
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut active: Vec<usize> = (0..stocks.len()).collect();
        let mut passes = 0;

        while !active.is_empty() && self.max_passes.is_none_or(|max| passes < max) {
            passes += 1;
            let scored = self.score(&stocks, &active, partition)?;

            let mut keep = Vec::with_capacity(active.len());
            for (&i, (z_scores, dispersed)) in active.iter().zip(scored) {
                for metric in Metric::ALL {
                    if dispersed[metric.index()] {
                        continue;
                    }
                    let sector = partition.map(|_| stocks[i].identity.sector_key());
                    if !seen.insert((metric, sector)) {
                        continue;
                    }
                    let warning = DispersionWarning {
                        metric,
                        sector: partition.map(|_| stocks[i].sector().trim().to_string()),
                    };
                    warn!(%warning, "undefined dispersion, z-score filter skipped for metric");
                    warnings.push(warning);
                }

                if z_scores.exceeds(self.threshold) {
                    removed[i] = Some(z_scores);
                } else {
                    keep.push(i);
                }
            }

            debug!(pass = passes, removed = active.len() - keep.len(), "z-score pass");
            if keep.len() == active.len() {
                break;
            }
            active = keep;
        }

        let mut outcome = ZScoreOutcome {
            warnings,
            ..ZScoreOutcome::default()
        };
        for (stock, z_scores) in stocks.into_iter().zip(removed) {
            match z_scores {
                Some(z_scores) => outcome.extreme.push(ExtremeStock { stock, z_scores }),
                None => outcome.retained.push(stock),
            }
        }
        Ok(outcome)
    }

    /// Z-scores of the active rows and whether each metric had dispersion.
    fn score(
        &self,
        stocks: &[EvaluatedStock],
        active: &[usize],
        partition: Option<&str>,
    ) -> PolarsResult<Vec<(ZScores, [bool; 3])>> {
        let mut exprs = Vec::with_capacity(Metric::ALL.len() * 2);
        for metric in Metric::ALL {
            let column = metric.column();
            exprs.push(iqr(column, partition).alias(format!("{column}_iqr")));
            exprs.push(
                robust_z(column, self.consistency, partition).alias(format!("{column}_z")),
            );
        }

        let df = metrics_frame(active.iter().map(|&i| &stocks[i]))?
            .lazy()
            .with_columns(exprs)
            .collect()?;

        let mut rows = vec![(ZScores::default(), [false; 3]); df.height()];
        for metric in Metric::ALL {
            let column = metric.column();
            let spreads = df.column(&format!("{column}_iqr"))?.f64()?;
            let z_scores = df.column(&format!("{column}_z"))?.f64()?;
            for (row, (spread, z)) in rows.iter_mut().zip(spreads.into_iter().zip(z_scores)) {
                row.0.values[metric.index()] = z;
                row.1[metric.index()] = spread.is_some_and(|s| s > 0.0);
            }
        }
        Ok(rows)
    }
}

/// Outcome of the full outlier filter.
#[derive(Debug, Clone, Default)]
pub struct OutlierReport {
    /// Rows surviving both passes (`filtered_stock_data`)
    pub retained: Vec<EvaluatedStock>,
    /// Rows with a metric equal to 99
    pub flagged_99: Vec<EvaluatedStock>,
    /// Rows with a metric equal to -99
    pub flagged_neg99: Vec<EvaluatedStock>,
    /// Rows with a metric equal to -100
    pub flagged_neg100: Vec<EvaluatedStock>,
    /// Rows removed by the z-score pass
    pub extreme: Vec<ExtremeStock>,
    /// Metrics skipped for zero dispersion
    pub warnings: Vec<DispersionWarning>,
}

impl OutlierReport {
    /// Rows assigned to a sentinel report.
    pub fn flagged(&self, sentinel: Sentinel) -> &[EvaluatedStock] {
        match sentinel {
            Sentinel::High => &self.flagged_99,
            Sentinel::Low => &self.flagged_neg99,
            Sentinel::Floor => &self.flagged_neg100,
        }
    }

    /// Total number of rows across every output of the filter.
    pub fn total(&self) -> usize {
        self.retained.len()
            + self.flagged_99.len()
            + self.flagged_neg99.len()
            + self.flagged_neg100.len()
            + self.extreme.len()
    }
}

/// Sentinel exclusion followed by robust z-score exclusion.
#[derive(Debug, Clone, Default)]
pub struct OutlierFilter {
    config: OutlierConfig,
}

impl OutlierFilter {
    /// Create a filter from its configuration.
    pub const fn new(config: OutlierConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &OutlierConfig {
        &self.config
    }

    /// Run both passes.
    ///
    /// # Errors
    ///
    /// Returns an error if the z-score statistics cannot be computed.
    pub fn apply(&self, stocks: Vec<EvaluatedStock>) -> PolarsResult<OutlierReport> {
        let mut report = OutlierReport::default();
        let mut unflagged = Vec::with_capacity(stocks.len());

        for stock in stocks {
            match Sentinel::classify(&stock.metrics.values()) {
                Some(Sentinel::High) => report.flagged_99.push(stock),
                Some(Sentinel::Low) => report.flagged_neg99.push(stock),
                Some(Sentinel::Floor) => report.flagged_neg100.push(stock),
                None => unflagged.push(stock),
            }
        }

        info!(
            flagged_99 = report.flagged_99.len(),
            flagged_neg99 = report.flagged_neg99.len(),
            flagged_neg100 = report.flagged_neg100.len(),
            remaining = unflagged.len(),
            "sentinel pass applied"
        );

        let outcome = ZScoreFilter::from_config(&self.config).apply(unflagged)?;
        info!(
            threshold = self.config.z_threshold,
            extreme = outcome.extreme.len(),
            retained = outcome.retained.len(),
            "z-score pass applied"
        );

        report.retained = outcome.retained;
        report.extreme = outcome.extreme;
        report.warnings = outcome.warnings;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{Estimates, Growth, GrowthMetrics};
    use screener_data::Identity;

    fn stock(ticker: &str, sector: &str, values: [f64; 3]) -> EvaluatedStock {
        let growth = |v: f64| {
            if v == Growth::FLAG_HIGH {
                Growth::FlagHigh
            } else if v == Growth::FLAG_LOW {
                Growth::FlagLow
            } else {
                Growth::Ratio(v)
            }
        };
        EvaluatedStock {
            row: 0,
            identity: Identity {
                ticker: ticker.to_string(),
                sector: sector.to_string(),
                ..Identity::default()
            },
            estimates: Estimates {
                f0: 1.0,
                f1: 1.0,
                f2: 1.0,
                annual_sales: 1.0,
                f1_sales_estimate: 1.0,
            },
            metrics: GrowthMetrics {
                sales_growth_f1: growth(values[0]),
                earnings_growth_f1: growth(values[1]),
                earnings_growth_f2: growth(values[2]),
            },
            price_changes: None,
        }
    }

    fn tickers(stocks: &[EvaluatedStock]) -> Vec<&str> {
        stocks.iter().map(EvaluatedStock::ticker).collect()
    }

    fn spread(n: usize) -> Vec<EvaluatedStock> {
        (0..n)
            .map(|i| {
                let v = 0.1 * i as f64;
                stock(&format!("S{i}"), "Tech", [v, v, v])
            })
            .collect()
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(Sentinel::classify(&[0.1, 99.0, -99.0]), Some(Sentinel::High));
        assert_eq!(Sentinel::classify(&[-100.0, -99.0, 0.0]), Some(Sentinel::Low));
        assert_eq!(Sentinel::classify(&[-100.0, 0.2, 0.0]), Some(Sentinel::Floor));
        assert_eq!(Sentinel::classify(&[0.1, 0.2, 98.9]), None);
    }

    #[test]
    fn test_sentinel_rows_partitioned() {
        let mut stocks = spread(5);
        stocks.push(stock("HIGH", "Tech", [0.1, 99.0, 0.1]));
        stocks.push(stock("BOTH", "Tech", [0.1, 99.0, -99.0]));
        stocks.push(stock("LOW", "Tech", [0.1, 0.1, -99.0]));
        stocks.push(stock("FLOOR", "Tech", [-100.0, 0.1, 0.1]));

        let report = OutlierFilter::default().apply(stocks).unwrap();
        assert_eq!(tickers(&report.flagged_99), vec!["HIGH", "BOTH"]);
        assert_eq!(tickers(&report.flagged_neg99), vec!["LOW"]);
        assert_eq!(tickers(report.flagged(Sentinel::Floor)), vec!["FLOOR"]);
        assert_eq!(report.retained.len(), 5);
        assert_eq!(report.total(), 9);
    }

    #[test]
    fn test_extreme_row_removed() {
        let mut stocks = spread(10);
        stocks.push(stock("FAR", "Tech", [50.0, 0.3, 0.3]));

        let report = OutlierFilter::default().apply(stocks).unwrap();
        assert_eq!(report.extreme.len(), 1);
        let extreme = &report.extreme[0];
        assert_eq!(extreme.stock.ticker(), "FAR");
        assert!(extreme.z_scores.get(Metric::SalesGrowthF1).unwrap() > 3.0);
        assert!(extreme.z_scores.get(Metric::EarningsGrowthF1).unwrap().abs() <= 3.0);
        assert_eq!(report.retained.len(), 10);
    }

    #[test]
    fn test_zero_iqr_skips_metric() {
        let stocks: Vec<EvaluatedStock> = (0..6)
            .map(|i| stock(&format!("S{i}"), "Tech", [0.5, 0.1 * i as f64, 0.2]))
            .chain(std::iter::once(stock("ODD", "Tech", [40.0, 0.2, 0.2])))
            .collect();

        let report = OutlierFilter::default().apply(stocks).unwrap();
        assert!(report.extreme.is_empty());
        assert_eq!(report.retained.len(), 7);
        let skipped: Vec<Metric> = report.warnings.iter().map(|w| w.metric).collect();
        assert!(skipped.contains(&Metric::SalesGrowthF1));
        assert!(skipped.contains(&Metric::EarningsGrowthF2));
        assert!(!skipped.contains(&Metric::EarningsGrowthF1));
    }

    #[test]
    fn test_idempotent() {
        let mut stocks = spread(12);
        stocks.push(stock("FAR1", "Tech", [9.0, 0.3, 0.3]));
        stocks.push(stock("FAR2", "Tech", [5.5, 0.3, 0.3]));
        stocks.push(stock("FLAG", "Tech", [0.3, -99.0, 0.3]));

        let filter = OutlierFilter::default();
        let first = filter.apply(stocks).unwrap();
        let retained = first.retained.clone();
        let second = filter.apply(first.retained).unwrap();

        assert!(second.extreme.is_empty());
        assert!(second.flagged_neg99.is_empty());
        assert_eq!(second.retained, retained);
    }

    #[test]
    fn test_sector_scope_uses_group_statistics() {
        let mut stocks: Vec<EvaluatedStock> = (0..8)
            .map(|i| stock(&format!("T{i}"), "Tech", [0.1 * i as f64, 0.1, 0.1 * i as f64]))
            .collect();
        stocks.extend(
            (0..8).map(|i| stock(&format!("U{i}"), "Utilities", [10.0 + 0.1 * i as f64, 0.1, 0.1])),
        );

        let universe = OutlierFilter::default().apply(stocks.clone()).unwrap();
        let sector = OutlierFilter::new(OutlierConfig {
            scope: ZScoreScope::Sector,
            ..OutlierConfig::default()
        })
        .apply(stocks)
        .unwrap();

        assert_eq!(universe.retained.len(), 16);
        assert_eq!(sector.retained.len(), 16);
        assert!(
            sector
                .warnings
                .iter()
                .any(|w| w.sector.as_deref() == Some("Utilities"))
        );
    }

    #[test]
    fn test_custom_threshold_filter() {
        let mut stocks = spread(10);
        stocks.push(stock("MID", "Tech", [1.8, 0.4, 0.4]));

        let loose = ZScoreFilter::new(3.0, CONSISTENCY_CONSTANT, ZScoreScope::Universe);
        let tight = ZScoreFilter::new(0.5, CONSISTENCY_CONSTANT, ZScoreScope::Universe);
        assert!(loose.apply(stocks.clone()).unwrap().extreme.is_empty());
        assert!(!tight.apply(stocks).unwrap().extreme.is_empty());
    }

    #[test]
    fn test_single_pass_keeps_first_survivors() {
        let filter = ZScoreFilter::new(0.5, CONSISTENCY_CONSTANT, ZScoreScope::Universe);

        let once = filter.with_max_passes(1).apply(spread(10)).unwrap();
        assert_eq!(
            tickers(&once.retained),
            vec!["S2", "S3", "S4", "S5", "S6", "S7"]
        );
        assert_eq!(once.extreme.len(), 4);

        // Below the consistency constant every pair scores past the threshold.
        let repeated = filter.apply(spread(10)).unwrap();
        assert!(repeated.retained.is_empty());
    }

    #[test]
    fn test_sector_scope_normalises_names() {
        let stocks: Vec<EvaluatedStock> = (0..8)
            .map(|i| {
                let sector = if i % 2 == 0 { "Tech" } else { " tech " };
                stock(&format!("T{i}"), sector, [0.1 * i as f64, 0.1, 0.1 * i as f64])
            })
            .collect();

        let report = OutlierFilter::new(OutlierConfig {
            scope: ZScoreScope::Sector,
            ..OutlierConfig::default()
        })
        .apply(stocks)
        .unwrap();

        assert_eq!(report.retained.len(), 8);
        assert_eq!(
            report.warnings,
            vec![DispersionWarning {
                metric: Metric::EarningsGrowthF1,
                sector: Some("Tech".to_string()),
            }]
        );
    }
}
