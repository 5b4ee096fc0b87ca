//! Validity filter.
//!
//! Turns raw records into [`EvaluatedStock`]s. Rows whose inputs are missing,
//! non-numeric or would divide by zero are set aside as [`Rejection`]s; they
//! never abort the run.

use crate::error::ExclusionReason;
use crate::growth::{Estimates, GrowthMetrics};
use crate::metric::Metric;
use crate::momentum::MomentumWeights;
use screener_data::{Cell, Identity, PriceChanges, StockRecord};
use tracing::info;

/// A row with all three metrics defined.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedStock {
    /// 1-based data row of the source export
    pub row: usize,
    /// Descriptive fields
    pub identity: Identity,
    /// Validated inputs
    pub estimates: Estimates,
    /// Growth metrics
    pub metrics: GrowthMetrics,
    /// Price changes, when available
    pub price_changes: Option<PriceChanges>,
}

impl EvaluatedStock {
    /// Evaluate a record.
    ///
    /// # Errors
    ///
    /// Returns the first reason the record cannot produce all three metrics.
    pub fn evaluate(record: StockRecord) -> Result<Self, ExclusionReason> {
        let mut values = [0.0; 5];
        for (slot, (field, cell)) in values.iter_mut().zip(record.estimates.cells()) {
            *slot = match cell {
                Cell::Value(v) => *v,
                Cell::Missing => return Err(ExclusionReason::MissingValue { field }),
                Cell::Invalid(raw) => {
                    return Err(ExclusionReason::NotNumeric {
                        field,
                        raw: raw.clone(),
                    });
                }
            };
        }
        let [f0, f1, f2, annual_sales, f1_sales_estimate] = values;
        let estimates = Estimates {
            f0,
            f1,
            f2,
            annual_sales,
            f1_sales_estimate,
        };
        let metrics = GrowthMetrics::compute(&estimates)?;

        Ok(Self {
            row: record.row,
            identity: record.identity,
            estimates,
            metrics,
            price_changes: record.price_changes,
        })
    }

    /// Ticker symbol.
    pub fn ticker(&self) -> &str {
        &self.identity.ticker
    }

    /// Sector name.
    pub fn sector(&self) -> &str {
        &self.identity.sector
    }

    /// Reported value of a metric.
    pub const fn value(&self, metric: Metric) -> f64 {
        self.metrics.get(metric).value()
    }

    /// Momentum score, when price changes are available.
    pub fn momentum(&self, weights: &MomentumWeights) -> Option<f64> {
        self.price_changes.as_ref().map(|p| weights.score(p))
    }
}

/// A record excluded by the validity filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// 1-based data row of the source export
    pub row: usize,
    /// Ticker of the row
    pub ticker: String,
    /// Why the row was excluded
    pub reason: ExclusionReason,
}

/// Result of the validity filter.
#[derive(Debug, Clone, Default)]
pub struct ValidityOutcome {
    /// Rows with all metrics defined, in input order
    pub valid: Vec<EvaluatedStock>,
    /// Excluded rows, in input order
    pub rejected: Vec<Rejection>,
}

/// Apply the validity filter to a batch of records.
pub fn validate(records: Vec<StockRecord>) -> ValidityOutcome {
    let mut outcome = ValidityOutcome::default();

    for record in records {
        let row = record.row;
        let ticker = record.identity.display_ticker().to_string();
        match EvaluatedStock::evaluate(record) {
            Ok(stock) => outcome.valid.push(stock),
            Err(reason) => {
                info!(row, ticker = %ticker, %reason, "row excluded");
                outcome.rejected.push(Rejection {
                    row,
                    ticker,
                    reason,
                });
            }
        }
    }

    info!(
        valid = outcome.valid.len(),
        rejected = outcome.rejected.len(),
        "validity filter applied"
    );
    outcome
}
