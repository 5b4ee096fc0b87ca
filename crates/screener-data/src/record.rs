//! Stock records read from an export.

use crate::cell::Cell;
use crate::field::Field;
use serde::{Deserialize, Serialize};

/// Descriptive fields of a listed company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Company name
    pub company_name: String,

    /// Ticker symbol
    pub ticker: String,

    /// Market capitalization in millions, when it parses
    pub market_cap: Option<f64>,

    /// Sector classification
    pub sector: String,

    /// Industry classification
    pub industry: String,

    /// Listing exchange
    pub exchange: String,

    /// Month of fiscal year end
    pub fiscal_year_end: String,
}

impl Identity {
    /// Ticker for log and report output, `<unknown>` when blank.
    pub fn display_ticker(&self) -> &str {
        if self.ticker.is_empty() {
            "<unknown>"
        } else {
            &self.ticker
        }
    }

    /// Grouping key of the sector.
    pub fn sector_key(&self) -> String {
        sector_key(&self.sector)
    }
}

/// Sector names compared ignoring case and surrounding space.
pub fn sector_key(sector: &str) -> String {
    sector.trim().to_lowercase()
}

/// Estimate inputs as coerced from the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEstimates {
    /// Current fiscal year EPS consensus (F0)
    pub f0: Cell,

    /// Next fiscal year EPS consensus (F1)
    pub f1: Cell,

    /// Following fiscal year EPS consensus (F2)
    pub f2: Cell,

    /// Annual sales
    pub annual_sales: Cell,

    /// Next fiscal year sales consensus
    pub f1_sales_estimate: Cell,
}

impl RawEstimates {
    /// Cells paired with the field they were read from, in input order.
    pub fn cells(&self) -> [(Field, &Cell); 5] {
        [
            (Field::F0Estimate, &self.f0),
            (Field::F1Estimate, &self.f1),
            (Field::F2Estimate, &self.f2),
            (Field::AnnualSales, &self.annual_sales),
            (Field::F1SalesEstimate, &self.f1_sales_estimate),
        ]
    }
}

/// Percentage price changes over several horizons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChanges {
    /// One week change
    pub week_1: f64,

    /// Four week change
    pub week_4: f64,

    /// Twelve week change
    pub week_12: f64,

    /// Year-to-date change
    pub year_to_date: f64,
}

/// One data row of a screener export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 1-based data row number (header excluded)
    pub row: usize,

    /// Descriptive fields
    pub identity: Identity,

    /// Estimate inputs
    pub estimates: RawEstimates,

    /// Price changes, present when the export carries every horizon and all parse
    pub price_changes: Option<PriceChanges>,
}
