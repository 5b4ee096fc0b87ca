//! Canonical fields of a screener export.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A column the screener knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Company name
    CompanyName,

    /// Ticker symbol
    Ticker,

    /// Market capitalization in millions
    MarketCap,

    /// Sector classification
    Sector,

    /// Industry classification
    Industry,

    /// Listing exchange (e.g. NSDQ, NYSE)
    Exchange,

    /// Month in which the fiscal year ends
    FiscalYearEnd,

    /// Current fiscal year consensus earnings estimate
    F0Estimate,

    /// Next fiscal year consensus earnings estimate
    F1Estimate,

    /// Following fiscal year consensus earnings estimate
    F2Estimate,

    /// Annual sales in millions
    AnnualSales,

    /// Next fiscal year consensus sales estimate in millions
    F1SalesEstimate,

    /// One week price change in percent
    PriceChange1W,

    /// Four week price change in percent
    PriceChange4W,

    /// Twelve week price change in percent
    PriceChange12W,

    /// Year-to-date price change in percent
    PriceChangeYtd,
}

impl Field {
    /// Fields every export must carry.
    pub const REQUIRED: [Self; 12] = [
        Self::CompanyName,
        Self::Ticker,
        Self::MarketCap,
        Self::Sector,
        Self::Industry,
        Self::Exchange,
        Self::FiscalYearEnd,
        Self::F0Estimate,
        Self::F1Estimate,
        Self::F2Estimate,
        Self::AnnualSales,
        Self::F1SalesEstimate,
    ];

    /// Price change fields used by the momentum score when present.
    pub const PRICE_CHANGES: [Self; 4] = [
        Self::PriceChange1W,
        Self::PriceChange4W,
        Self::PriceChange12W,
        Self::PriceChangeYtd,
    ];

    /// Returns all known fields, required ones first.
    pub fn all() -> Vec<Self> {
        Self::REQUIRED
            .iter()
            .chain(Self::PRICE_CHANGES.iter())
            .copied()
            .collect()
    }

    /// Column label as it appears in the screener export.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CompanyName => "Company Name",
            Self::Ticker => "Ticker",
            Self::MarketCap => "Market Cap (mil)",
            Self::Sector => "Sector",
            Self::Industry => "Industry",
            Self::Exchange => "Exchange",
            Self::FiscalYearEnd => "Month of Fiscal Yr End",
            Self::F0Estimate => "F0 Consensus Est.",
            Self::F1Estimate => "F1 Consensus Est.",
            Self::F2Estimate => "F2 Consensus Est.",
            Self::AnnualSales => "Annual Sales ($mil)",
            Self::F1SalesEstimate => "F(1) Consensus Sales Est. ($mil)",
            Self::PriceChange1W => "% Price Change (1 Week)",
            Self::PriceChange4W => "% Price Change (4 Weeks)",
            Self::PriceChange12W => "% Price Change (12 Weeks)",
            Self::PriceChangeYtd => "% Price Change (YTD)",
        }
    }

    /// Normalized form of the label used for matching headers.
    pub fn key(&self) -> String {
        normalize_label(self.label())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lower-cases a header and drops everything that is not alphanumeric.
///
/// `"F(1) Consensus Sales Est. ($mil)"` becomes `"f1consensussalesestmil"`.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
