//! The three growth metrics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A derived growth metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Next fiscal year sales growth (SG-F1)
    SalesGrowthF1,
    /// Earnings growth from F0 to F1 (EG-F1)
    EarningsGrowthF1,
    /// Earnings growth from F1 to F2 (EG-F2)
    EarningsGrowthF2,
}

impl Metric {
    /// All metrics in report column order.
    pub const ALL: [Self; 3] = [
        Self::SalesGrowthF1,
        Self::EarningsGrowthF1,
        Self::EarningsGrowthF2,
    ];

    /// Report column label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SalesGrowthF1 => "SG-F1",
            Self::EarningsGrowthF1 => "EG-F1",
            Self::EarningsGrowthF2 => "EG-F2",
        }
    }

    /// Frame column name.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::SalesGrowthF1 => "sg_f1",
            Self::EarningsGrowthF1 => "eg_f1",
            Self::EarningsGrowthF2 => "eg_f2",
        }
    }

    /// Position in [`Metric::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            Self::SalesGrowthF1 => 0,
            Self::EarningsGrowthF1 => 1,
            Self::EarningsGrowthF2 => 2,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_order() {
        for metric in Metric::ALL {
            assert_eq!(Metric::ALL[metric.index()], metric);
        }
        assert_eq!(Metric::EarningsGrowthF2.to_string(), "EG-F2");
        assert_eq!(Metric::SalesGrowthF1.column(), "sg_f1");
    }
}
