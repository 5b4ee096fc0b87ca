//! Screening pipeline.
//!
//! Exchange filter, metric calculation, validity filter, outlier filter and
//! sector aggregation, run in that order over one loaded export.

use crate::config::ScreenConfig;
use crate::error::Result;
use crate::ranking::{RankRequest, RankedStock, Ranker};
use crate::sector::{SectorAggregator, SectorSummary};
use screener_data::{ScreenTable, StockRecord, load_csv};
use screener_metrics::{EvaluatedStock, OutlierFilter, OutlierReport, Rejection, validate};
use screener_output::RunSummary;
use std::path::Path;
use tracing::info;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct ScreenResult {
    /// Counts for the run
    pub summary: RunSummary,
    /// Rows excluded by the validity filter
    pub rejected: Vec<Rejection>,
    /// Outcome of the outlier filter
    pub outliers: OutlierReport,
    /// Per-sector means of the filtered stocks
    pub sectors: Vec<SectorSummary>,
}

impl ScreenResult {
    /// Stocks surviving every filter.
    pub fn filtered(&self) -> &[EvaluatedStock] {
        &self.outliers.retained
    }

    /// Summary of one sector, ignoring case.
    pub fn sector(&self, name: &str) -> Option<&SectorSummary> {
        self.sectors.iter().find(|s| s.matches(name))
    }
}

/// A configured screening pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ScreenConfig,
}

impl Pipeline {
    /// Create a pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ScreenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Load a CSV export and screen it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or aggregation fails.
    pub fn run_file(&self, path: &Path) -> Result<ScreenResult> {
        let table = load_csv(path)?;
        self.run(table, &path.display().to_string())
    }

    /// Screen a loaded export.
    ///
    /// # Errors
    ///
    /// Returns an error if sector aggregation fails.
    pub fn run(&self, table: ScreenTable, source: &str) -> Result<ScreenResult> {
        let mut summary = RunSummary::new(source);
        summary.rows_read = table.len();

        let records = self.filter_exchanges(table.records, &mut summary);

        let validity = validate(records);
        for rejection in &validity.rejected {
            summary.record_exclusion(rejection.reason.kind());
        }

        let outliers = OutlierFilter::new(self.config.outlier).apply(validity.valid)?;
        let sectors = SectorAggregator::new().aggregate(&outliers.retained)?;

        summary.filtered = outliers.retained.len();
        summary.flagged_99 = outliers.flagged_99.len();
        summary.flagged_neg99 = outliers.flagged_neg99.len();
        summary.flagged_neg100 = outliers.flagged_neg100.len();
        summary.extreme = outliers.extreme.len();
        summary.sectors = sectors.len();
        summary.undefined_dispersion = outliers.warnings.iter().map(ToString::to_string).collect();

        info!(%summary, "screen complete");
        Ok(ScreenResult {
            summary,
            rejected: validity.rejected,
            outliers,
            sectors,
        })
    }

    /// Rank the filtered stocks of a sector.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid request or unknown sector.
    pub fn rank(&self, result: &ScreenResult, request: &RankRequest) -> Result<Vec<RankedStock>> {
        Ranker::new(&self.config).rank(result.filtered(), &result.sectors, request)
    }

    fn filter_exchanges(
        &self,
        records: Vec<StockRecord>,
        summary: &mut RunSummary,
    ) -> Vec<StockRecord> {
        if self.config.exchanges.is_empty() {
            return records;
        }

        let before = records.len();
        let kept: Vec<StockRecord> = records
            .into_iter()
            .filter(|r| self.config.accepts_exchange(&r.identity.exchange))
            .collect();
        summary.excluded_exchange = before - kept.len();

        info!(
            exchanges = ?self.config.exchanges,
            kept = kept.len(),
            removed = summary.excluded_exchange,
            "exchange filter applied"
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompositeWeights;
    use screener_data::load_csv_bytes;

    const HEADER: &str = "Company Name,Ticker,Market Cap (mil),Sector,Industry,Exchange,\
Month of Fiscal Yr End,F0 Consensus Est.,F1 Consensus Est.,F2 Consensus Est.,\
Annual Sales ($mil),F(1) Consensus Sales Est. ($mil)";

    fn table(rows: &[&str]) -> ScreenTable {
        let csv = format!("{HEADER}\n{}\n", rows.join("\n"));
        load_csv_bytes(csv.into_bytes(), "test").unwrap()
    }

    #[test]
    fn test_end_to_end_sentinel() {
        let pipeline = Pipeline::new(ScreenConfig::default()).unwrap();
        let result = pipeline
            .run(
                table(&["Acme,ACME,100,Tech,Software,NSDQ,12,-5,10,12,100,120"]),
                "test",
            )
            .unwrap();

        assert!(result.rejected.is_empty());
        assert_eq!(result.outliers.flagged_99.len(), 1);
        let stock = &result.outliers.flagged_99[0];
        assert!((stock.metrics.sales_growth_f1.value() - 0.2).abs() < 1e-9);
        assert_eq!(stock.metrics.earnings_growth_f1.value(), 99.0);
        assert!(result.filtered().is_empty());
        assert!(result.sectors.is_empty());
    }

    #[test]
    fn test_exchange_filter_counts() {
        let config = ScreenConfig::default().with_exchanges(vec!["NYSE".to_string()]);
        let pipeline = Pipeline::new(config).unwrap();
        let result = pipeline
            .run(
                table(&[
                    "A,AAA,1,Tech,Soft,NYSE,12,1,1.1,1.2,100,110",
                    "B,BBB,1,Tech,Soft,AMEX,12,1,1.1,1.2,100,110",
                    "C,CCC,1,Tech,Soft,nyse,12,0,1.1,1.2,100,110",
                ]),
                "test",
            )
            .unwrap();

        assert_eq!(result.summary.rows_read, 3);
        assert_eq!(result.summary.excluded_exchange, 1);
        assert_eq!(result.summary.excluded_division_by_zero, 1);
        assert_eq!(result.filtered().len(), 1);
        assert_eq!(result.sector("tech").map(|s| s.count), Some(1));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScreenConfig {
            weights: CompositeWeights::new(f64::INFINITY, 0.3, 0.3),
            ..ScreenConfig::default()
        };
        assert!(Pipeline::new(config).is_err());
    }
}
