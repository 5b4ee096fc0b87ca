//! Robust statistics as polars expressions.
//!
//! Median and interquartile range are used instead of mean and standard
//! deviation so that the extreme values being screened out do not inflate
//! the dispersion they are measured against. Quantiles are linearly
//! interpolated. Every expression takes an optional partition column; when
//! given, the statistic is computed within each partition.

use polars::prelude::*;

/// Consistency constant relating the IQR-scaled z-score to a standard normal.
pub const CONSISTENCY_CONSTANT: f64 = 0.6745;

/// Median of a column.
pub fn median(column: &str, partition: Option<&str>) -> Expr {
    windowed(col(column).median(), partition)
}

/// Quantile `q` in `[0, 1]` of a column.
pub fn quantile(column: &str, q: f64, partition: Option<&str>) -> Expr {
    windowed(
        col(column).quantile(lit(q), QuantileMethod::Linear),
        partition,
    )
}

/// 75th minus 25th percentile of a column.
pub fn iqr(column: &str, partition: Option<&str>) -> Expr {
    quantile(column, 0.75, partition) - quantile(column, 0.25, partition)
}

/// Robust z-score `k * (x - median) / IQR`, null where the IQR is zero.
pub fn robust_z(column: &str, consistency: f64, partition: Option<&str>) -> Expr {
    let spread = iqr(column, partition);
    when(spread.clone().gt(lit(0.0)))
        .then(lit(consistency) * (col(column) - median(column, partition)) / spread)
        .otherwise(lit(NULL))
}

fn windowed(expr: Expr, partition: Option<&str>) -> Expr {
    match partition {
        Some(group) => expr.over([col(group)]),
        None => expr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(values: &[f64]) -> DataFrame {
        DataFrame::new(vec![Column::new("x".into(), values.to_vec())]).unwrap()
    }

    fn eval(df: DataFrame, expr: Expr) -> Vec<Option<f64>> {
        let out = df.lazy().select([expr.alias("out")]).collect().unwrap();
        out.column("out").unwrap().f64().unwrap().into_iter().collect()
    }

    fn scalar(values: &[f64], expr: Expr) -> f64 {
        eval(frame(values), expr)[0].unwrap()
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(scalar(&values, quantile("x", 0.25, None)), 1.75);
        assert_relative_eq!(scalar(&values, quantile("x", 0.75, None)), 3.25);
        assert_relative_eq!(scalar(&values, quantile("x", 1.0, None)), 4.0);
        assert_relative_eq!(scalar(&values, iqr("x", None)), 1.5);
    }

    #[test]
    fn test_median_unsorted() {
        assert_relative_eq!(scalar(&[5.0, 1.0, 3.0], median("x", None)), 3.0);
        assert_relative_eq!(scalar(&[4.0, 1.0, 3.0, 2.0], median("x", None)), 2.5);
    }

    #[test]
    fn test_robust_z_score() {
        let z = eval(
            frame(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            robust_z("x", CONSISTENCY_CONSTANT, None),
        );
        assert_eq!(z.len(), 5);
        assert_relative_eq!(z[2].unwrap(), 0.0);
        assert_relative_eq!(z[4].unwrap(), 0.6745);
        assert_relative_eq!(z[0].unwrap(), -0.6745);
    }

    #[test]
    fn test_zero_iqr_has_no_z_score() {
        let values = [2.0, 2.0, 2.0, 2.0, 50.0];
        assert_eq!(scalar(&values, iqr("x", None)), 0.0);
        let z = eval(frame(&values), robust_z("x", CONSISTENCY_CONSTANT, None));
        assert!(z.iter().all(Option::is_none));
    }

    #[test]
    fn test_partitioned_statistics() {
        let df = DataFrame::new(vec![
            Column::new("group".into(), vec!["a", "a", "a", "b", "b", "b", "b"]),
            Column::new("x".into(), vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 40.0]),
        ])
        .unwrap();

        let medians = eval(df.clone(), median("x", Some("group")));
        assert_eq!(medians.len(), 7);
        assert_relative_eq!(medians[0].unwrap(), 2.0);
        assert_relative_eq!(medians[6].unwrap(), 25.0);

        let z = eval(df, robust_z("x", CONSISTENCY_CONSTANT, Some("group")));
        assert_relative_eq!(z[2].unwrap(), 0.6745);
        // b: median 25, IQR 32.5 - 17.5
        assert_relative_eq!(z[6].unwrap(), 0.6745 * 15.0 / 15.0);
    }
}
