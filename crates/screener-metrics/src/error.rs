//! Row exclusion reasons.

use crate::metric::Metric;
use screener_data::Field;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a row was excluded before its metrics could be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExclusionReason {
    /// A required input is empty
    #[error("missing value for {field}")]
    MissingValue {
        /// Field that was empty
        field: Field,
    },

    /// A required input does not coerce to a number
    #[error("non-numeric value {raw:?} for {field}")]
    NotNumeric {
        /// Field that failed to parse
        field: Field,
        /// Original cell text
        raw: String,
    },

    /// A metric's denominator is exactly zero
    #[error("division by zero computing {metric}: {denominator} is 0")]
    DivisionByZero {
        /// Metric being computed
        metric: Metric,
        /// Denominator field
        denominator: Field,
    },

    /// A metric overflowed to a non-finite value
    #[error("{metric} is not finite")]
    NonFinite {
        /// Metric being computed
        metric: Metric,
    },
}

impl ExclusionReason {
    /// Category used for summary counts.
    pub const fn kind(&self) -> ExclusionKind {
        match self {
            Self::MissingValue { .. } => ExclusionKind::MissingValue,
            Self::NotNumeric { .. } => ExclusionKind::NotNumeric,
            Self::DivisionByZero { .. } => ExclusionKind::DivisionByZero,
            Self::NonFinite { .. } => ExclusionKind::NonFinite,
        }
    }
}

/// Summary category of an exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionKind {
    /// Required input empty
    MissingValue,
    /// Required input not numeric
    NotNumeric,
    /// Zero denominator
    DivisionByZero,
    /// Overflowed metric
    NonFinite,
}

impl ExclusionKind {
    /// All kinds in summary order.
    pub const ALL: [Self; 4] = [
        Self::MissingValue,
        Self::NotNumeric,
        Self::DivisionByZero,
        Self::NonFinite,
    ];

    /// Short label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MissingValue => "missing value",
            Self::NotNumeric => "non-numeric",
            Self::DivisionByZero => "division by zero",
            Self::NonFinite => "non-finite",
        }
    }
}

impl fmt::Display for ExclusionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
