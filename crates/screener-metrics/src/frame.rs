//! Polars frames of evaluated stocks.

use crate::metric::Metric;
use crate::validity::EvaluatedStock;
use polars::prelude::*;

/// Sector name as reported.
pub const SECTOR: &str = "sector";
/// Normalised sector used for grouping.
pub const SECTOR_KEY: &str = "sector_key";
/// Ticker symbol.
pub const TICKER: &str = "ticker";

/// Frame with sector, sector key, ticker and one column per metric.
///
/// # Errors
///
/// Returns an error if the frame cannot be built.
pub fn metrics_frame<'a, I>(stocks: I) -> PolarsResult<DataFrame>
where
    I: IntoIterator<Item = &'a EvaluatedStock>,
{
    let stocks: Vec<&EvaluatedStock> = stocks.into_iter().collect();
    let sectors: Vec<&str> = stocks.iter().map(|s| s.sector()).collect();
    let keys: Vec<String> = stocks.iter().map(|s| s.identity.sector_key()).collect();
    let tickers: Vec<&str> = stocks.iter().map(|s| s.ticker()).collect();

    let mut columns = vec![
        Column::new(SECTOR.into(), sectors),
        Column::new(SECTOR_KEY.into(), keys),
        Column::new(TICKER.into(), tickers),
    ];
    for metric in Metric::ALL {
        let values: Vec<f64> = stocks.iter().map(|s| s.value(metric)).collect();
        columns.push(Column::new(metric.column().into(), values));
    }

    DataFrame::new(columns)
}
