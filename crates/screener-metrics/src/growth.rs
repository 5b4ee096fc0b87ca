//! Growth metric calculation.
//!
//! Earnings growth between two fiscal estimates is only a meaningful ratio
//! when the base estimate is positive and the next one is not negative. A
//! move from a loss to a profit is flagged as [`Growth::FlagHigh`] (reported
//! as `99`), every other sign change or persisting loss as
//! [`Growth::FlagLow`] (`-99`). A zero base has no defined growth and
//! excludes the row.

use crate::error::ExclusionReason;
use crate::metric::Metric;
use screener_data::Field;
use serde::{Deserialize, Serialize};

/// Outcome of a growth formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Growth {
    /// A finite growth ratio
    Ratio(f64),
    /// Loss turning into profit, reported as 99
    FlagHigh,
    /// Loss persisting or profit turning into loss, reported as -99
    FlagLow,
}

impl Growth {
    /// Reported value of [`Growth::FlagHigh`].
    pub const FLAG_HIGH: f64 = 99.0;

    /// Reported value of [`Growth::FlagLow`].
    pub const FLAG_LOW: f64 = -99.0;

    /// Numeric value as written to reports.
    pub const fn value(&self) -> f64 {
        match self {
            Self::Ratio(v) => *v,
            Self::FlagHigh => Self::FLAG_HIGH,
            Self::FlagLow => Self::FLAG_LOW,
        }
    }

    /// Whether this is one of the sign flags rather than a ratio.
    pub const fn is_flag(&self) -> bool {
        !matches!(self, Self::Ratio(_))
    }
}

/// Earnings growth from `base` to `next`.
///
/// Returns `None` when `base` is zero.
pub fn earnings_growth(base: f64, next: f64) -> Option<Growth> {
    if base < 0.0 {
        Some(if next > 0.0 {
            Growth::FlagHigh
        } else {
            Growth::FlagLow
        })
    } else if base > 0.0 {
        Some(if next < 0.0 {
            Growth::FlagLow
        } else {
            Growth::Ratio(next / base - 1.0)
        })
    } else {
        None
    }
}

/// Sales growth from `annual_sales` to `sales_estimate`.
///
/// Returns `None` when `annual_sales` is zero.
pub fn sales_growth(annual_sales: f64, sales_estimate: f64) -> Option<Growth> {
    if annual_sales == 0.0 {
        None
    } else {
        Some(Growth::Ratio(sales_estimate / annual_sales - 1.0))
    }
}

/// Validated numeric inputs of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimates {
    /// Current fiscal year EPS consensus (F0)
    pub f0: f64,
    /// Next fiscal year EPS consensus (F1)
    pub f1: f64,
    /// Following fiscal year EPS consensus (F2)
    pub f2: f64,
    /// Annual sales
    pub annual_sales: f64,
    /// Next fiscal year sales consensus
    pub f1_sales_estimate: f64,
}

/// The three growth metrics of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    /// SG-F1
    pub sales_growth_f1: Growth,
    /// EG-F1
    pub earnings_growth_f1: Growth,
    /// EG-F2
    pub earnings_growth_f2: Growth,
}

impl GrowthMetrics {
    /// Compute all three metrics.
    ///
    /// # Errors
    ///
    /// Returns [`ExclusionReason::DivisionByZero`] for a zero denominator and
    /// [`ExclusionReason::NonFinite`] when a ratio overflows.
    pub fn compute(estimates: &Estimates) -> Result<Self, ExclusionReason> {
        let sales_growth_f1 = checked(
            Metric::SalesGrowthF1,
            Field::AnnualSales,
            sales_growth(estimates.annual_sales, estimates.f1_sales_estimate),
        )?;
        let earnings_growth_f1 = checked(
            Metric::EarningsGrowthF1,
            Field::F0Estimate,
            earnings_growth(estimates.f0, estimates.f1),
        )?;
        let earnings_growth_f2 = checked(
            Metric::EarningsGrowthF2,
            Field::F1Estimate,
            earnings_growth(estimates.f1, estimates.f2),
        )?;

        Ok(Self {
            sales_growth_f1,
            earnings_growth_f1,
            earnings_growth_f2,
        })
    }

    /// Outcome for one metric.
    pub const fn get(&self, metric: Metric) -> Growth {
        match metric {
            Metric::SalesGrowthF1 => self.sales_growth_f1,
            Metric::EarningsGrowthF1 => self.earnings_growth_f1,
            Metric::EarningsGrowthF2 => self.earnings_growth_f2,
        }
    }

    /// Reported values in [`Metric::ALL`] order.
    pub const fn values(&self) -> [f64; 3] {
        [
            self.sales_growth_f1.value(),
            self.earnings_growth_f1.value(),
            self.earnings_growth_f2.value(),
        ]
    }
}

fn checked(
    metric: Metric,
    denominator: Field,
    growth: Option<Growth>,
) -> Result<Growth, ExclusionReason> {
    match growth {
        None => Err(ExclusionReason::DivisionByZero {
            metric,
            denominator,
        }),
        Some(g) if !g.value().is_finite() => Err(ExclusionReason::NonFinite { metric }),
        Some(g) => Ok(g),
    }
}
