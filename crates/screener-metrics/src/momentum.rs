//! Price momentum score.

use screener_data::PriceChanges;
use serde::{Deserialize, Serialize};

/// Weights of each price change horizon in the momentum score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumWeights {
    /// Weight of the one week change (default: 0.25)
    pub week_1: f64,
    /// Weight of the four week change (default: 0.25)
    pub week_4: f64,
    /// Weight of the twelve week change (default: 0.25)
    pub week_12: f64,
    /// Weight of the year-to-date change (default: 0.25)
    pub year_to_date: f64,
}

impl Default for MomentumWeights {
    fn default() -> Self {
        Self {
            week_1: 0.25,
            week_4: 0.25,
            week_12: 0.25,
            year_to_date: 0.25,
        }
    }
}

impl MomentumWeights {
    /// Weighted sum of the price changes.
    pub fn score(&self, changes: &PriceChanges) -> f64 {
        self.week_1 * changes.week_1
            + self.week_4 * changes.week_4
            + self.week_12 * changes.week_12
            + self.year_to_date * changes.year_to_date
    }

    /// Whether every weight is finite.
    pub const fn is_finite(&self) -> bool {
        self.week_1.is_finite()
            && self.week_4.is_finite()
            && self.week_12.is_finite()
            && self.year_to_date.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_weights_average() {
        let changes = PriceChanges {
            week_1: 1.0,
            week_4: 2.0,
            week_12: 3.0,
            year_to_date: 6.0,
        };
        assert_relative_eq!(MomentumWeights::default().score(&changes), 3.0);
    }

    #[test]
    fn test_custom_weights() {
        let changes = PriceChanges {
            week_1: 10.0,
            week_4: 0.0,
            week_12: 0.0,
            year_to_date: -10.0,
        };
        let weights = MomentumWeights {
            week_1: 0.5,
            week_4: 0.0,
            week_12: 0.0,
            year_to_date: 0.5,
        };
        assert_relative_eq!(weights.score(&changes), 0.0);
        assert!(weights.is_finite());
    }
}
