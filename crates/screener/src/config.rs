//! Screen configuration.

use screener_metrics::{EvaluatedStock, Metric, MomentumWeights, OutlierConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Tolerance on the composite weight sum before a warning is logged.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Weights of the composite score `w1*SG-F1 + w2*EG-F1 + w3*EG-F2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    /// Weight of SG-F1 (default: 0.4)
    pub sales_growth: f64,
    /// Weight of EG-F1 (default: 0.3)
    pub earnings_growth_f1: f64,
    /// Weight of EG-F2 (default: 0.3)
    pub earnings_growth_f2: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            sales_growth: 0.4,
            earnings_growth_f1: 0.3,
            earnings_growth_f2: 0.3,
        }
    }
}

impl CompositeWeights {
    /// Create weights.
    pub const fn new(sales_growth: f64, earnings_growth_f1: f64, earnings_growth_f2: f64) -> Self {
        Self {
            sales_growth,
            earnings_growth_f1,
            earnings_growth_f2,
        }
    }

    /// Weight of one metric.
    pub const fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::SalesGrowthF1 => self.sales_growth,
            Metric::EarningsGrowthF1 => self.earnings_growth_f1,
            Metric::EarningsGrowthF2 => self.earnings_growth_f2,
        }
    }

    /// Sum of the weights.
    pub fn sum(&self) -> f64 {
        self.sales_growth + self.earnings_growth_f1 + self.earnings_growth_f2
    }

    /// Whether every weight is finite.
    pub const fn is_finite(&self) -> bool {
        self.sales_growth.is_finite()
            && self.earnings_growth_f1.is_finite()
            && self.earnings_growth_f2.is_finite()
    }

    /// Composite score of a stock.
    pub fn score(&self, stock: &EvaluatedStock) -> f64 {
        Metric::ALL
            .into_iter()
            .map(|metric| self.get(metric) * stock.value(metric))
            .sum()
    }
}

/// Configuration of a screening run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Exchanges to keep, compared ignoring case; empty keeps all (default: empty)
    pub exchanges: Vec<String>,
    /// Composite score weights
    pub weights: CompositeWeights,
    /// Outlier filter settings
    pub outlier: OutlierConfig,
    /// Momentum score weights
    pub momentum: MomentumWeights,
}

impl ScreenConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML for this schema.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Replace the exchange allow-list.
    pub fn with_exchanges(mut self, exchanges: Vec<String>) -> Self {
        self.exchanges = exchanges;
        self
    }

    /// Whether a row listed on `exchange` passes the allow-list.
    pub fn accepts_exchange(&self, exchange: &str) -> bool {
        let exchange = exchange.trim();
        self.exchanges.is_empty()
            || self
                .exchanges
                .iter()
                .any(|allowed| allowed.trim().eq_ignore_ascii_case(exchange))
    }

    /// Check value ranges.
    ///
    /// A composite weight sum away from 1.0 is allowed but logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-positive or non-finite
    /// threshold or constant, or non-finite weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let outlier = &self.outlier;
        if !(outlier.z_threshold.is_finite() && outlier.z_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "z_threshold must be finite and positive, got {}",
                outlier.z_threshold
            )));
        }
        if !(outlier.consistency_constant.is_finite() && outlier.consistency_constant > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "consistency_constant must be finite and positive, got {}",
                outlier.consistency_constant
            )));
        }
        if !self.weights.is_finite() {
            return Err(ConfigError::Invalid(
                "composite weights must be finite".to_string(),
            ));
        }
        if !self.momentum.is_finite() {
            return Err(ConfigError::Invalid(
                "momentum weights must be finite".to_string(),
            ));
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(sum, "composite weights do not sum to 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use screener_metrics::ZScoreScope;

    #[test]
    fn test_defaults() {
        let config = ScreenConfig::default();
        assert!(config.exchanges.is_empty());
        assert_relative_eq!(config.weights.sum(), 1.0);
        assert_eq!(config.outlier.z_threshold, 3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScreenConfig::from_toml_str(
            r#"
            exchanges = ["NSDQ", "NYSE"]

            [weights]
            sales_growth = 0.5

            [outlier]
            scope = "sector"
            "#,
        )
        .unwrap();

        assert_eq!(config.exchanges, vec!["NSDQ", "NYSE"]);
        assert_eq!(config.weights.sales_growth, 0.5);
        assert_eq!(config.weights.earnings_growth_f1, 0.3);
        assert_eq!(config.outlier.scope, ZScoreScope::Sector);
        assert_eq!(config.outlier.z_threshold, 3.0);
        assert_eq!(config.momentum, MomentumWeights::default());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ScreenConfig::default();
        config.outlier.z_threshold = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ScreenConfig::default();
        config.weights.sales_growth = f64::NAN;
        assert!(config.validate().is_err());

        assert!(ScreenConfig::from_toml_str("exchanges = 3").is_err());
    }

    #[test]
    fn test_unnormalized_weights_allowed() {
        let config = ScreenConfig {
            weights: CompositeWeights::new(1.0, 1.0, 1.0),
            ..ScreenConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_exchange_filter() {
        let open = ScreenConfig::default();
        assert!(open.accepts_exchange("OTC"));

        let config = ScreenConfig::default().with_exchanges(vec!["NSDQ".into(), "nyse".into()]);
        assert!(config.accepts_exchange("NYSE"));
        assert!(config.accepts_exchange(" nsdq "));
        assert!(!config.accepts_exchange("AMEX"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen.toml");
        fs::write(&path, "[outlier]\nz_threshold = 2.5\n").unwrap();
        let config = ScreenConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.outlier.z_threshold, 2.5);

        assert!(matches!(
            ScreenConfig::from_toml_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
