//! Numeric cell coercion.

use serde::{Deserialize, Serialize};

/// A numeric cell after coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Empty or absent cell
    Missing,
    /// Cell text that does not coerce to a finite number
    Invalid(String),
    /// Parsed value
    Value(f64),
}

impl Cell {
    /// Coerce raw cell text.
    ///
    /// Currency symbols, thousands separators and percent signs are stripped;
    /// only digits, sign, decimal point and exponent markers are kept before
    /// parsing.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Missing;
        };

        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
            .collect();

        match cleaned.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Value(value),
            _ => Self::Invalid(raw.to_string()),
        }
    }

    /// The parsed value, if any.
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12.5", 12.5)]
    #[case("-3", -3.0)]
    #[case("$1,234.5", 1234.5)]
    #[case("45%", 45.0)]
    #[case(" 7 ", 7.0)]
    #[case("1.5e3", 1500.0)]
    fn test_parses_values(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(Cell::parse(Some(raw)), Cell::Value(expected));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn test_missing(#[case] raw: Option<&str>) {
        assert_eq!(Cell::parse(raw), Cell::Missing);
    }

    #[rstest]
    #[case("N/A")]
    #[case("--")]
    #[case("1e999")]
    #[case("inf")]
    fn test_invalid(#[case] raw: &str) {
        assert_eq!(Cell::parse(Some(raw)), Cell::Invalid(raw.to_string()));
    }

    #[test]
    fn test_value_accessor() {
        assert_eq!(Cell::Value(2.0).value(), Some(2.0));
        assert_eq!(Cell::Missing.value(), None);
    }
}
