//! Sector aggregation.
//!
//! Per-sector means are computed with a polars group-by over a frame of the
//! filtered stocks. Sectors are grouped by their trimmed, lowercased name and
//! reported under the first spelling seen. Only sectors with members appear,
//! so no mean is NaN.

use polars::prelude::*;
use screener_data::sector_key;
use screener_metrics::frame::{SECTOR, SECTOR_KEY, TICKER, metrics_frame};
use screener_metrics::{EvaluatedStock, Metric};
use screener_output::SectorExport;
use tracing::info;

const COUNT: &str = "count";

/// Mean metrics of one sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorSummary {
    /// Sector name
    pub sector: String,
    /// Mean of each metric in [`Metric::ALL`] order
    pub means: [f64; 3],
    /// Number of stocks in the sector
    pub count: usize,
}

impl SectorSummary {
    /// Mean of one metric.
    pub const fn mean(&self, metric: Metric) -> f64 {
        self.means[metric.index()]
    }

    /// Whether this summary is for `sector`, ignoring case and surrounding space.
    pub fn matches(&self, sector: &str) -> bool {
        sector_key(&self.sector) == sector_key(sector)
    }

    /// Report row.
    pub fn to_export(&self) -> SectorExport {
        SectorExport::new(self.sector.clone(), self.means, self.count)
    }
}

/// Groups stocks by sector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorAggregator;

impl SectorAggregator {
    /// Create an aggregator.
    pub const fn new() -> Self {
        Self
    }

    /// Per-sector means, sorted by normalised sector name.
    ///
    /// # Errors
    ///
    /// Returns an error if the group-by fails.
    pub fn aggregate(&self, stocks: &[EvaluatedStock]) -> PolarsResult<Vec<SectorSummary>> {
        if stocks.is_empty() {
            return Ok(Vec::new());
        }

        let mut aggs: Vec<Expr> = Metric::ALL
            .into_iter()
            .map(|metric| col(metric.column()).mean())
            .collect();
        aggs.push(col(SECTOR).first());
        aggs.push(col(TICKER).count().cast(DataType::Int64).alias(COUNT));

        let df = metrics_frame(stocks)?
            .lazy()
            .group_by([col(SECTOR_KEY)])
            .agg(aggs)
            .sort([SECTOR_KEY], Default::default())
            .collect()?;

        let sectors = df.column(SECTOR)?.str()?;
        let counts = df.column(COUNT)?.i64()?;
        let means = Metric::ALL
            .into_iter()
            .map(|metric| df.column(metric.column())?.f64())
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut summaries = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (Some(sector), Some(count)) = (sectors.get(i), counts.get(i)) else {
                continue;
            };
            let count = usize::try_from(count).unwrap_or_default();
            if count == 0 {
                continue;
            }
            let mut values = [f64::NAN; 3];
            for (slot, column) in values.iter_mut().zip(&means) {
                if let Some(mean) = column.get(i) {
                    *slot = mean;
                }
            }
            summaries.push(SectorSummary {
                sector: sector.trim().to_string(),
                means: values,
                count,
            });
        }

        info!(sectors = summaries.len(), "sector averages computed");
        Ok(summaries)
    }
}
