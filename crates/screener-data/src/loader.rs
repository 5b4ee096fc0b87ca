//! CSV loading.
//!
//! Exports are read with polars as all-string frames so that coercion stays in
//! [`Cell::parse`] and a malformed cell only affects its own row.

use crate::cell::Cell;
use crate::error::{DataError, Result};
use crate::field::Field;
use crate::record::{Identity, PriceChanges, RawEstimates, StockRecord};
use crate::resolver::{ColumnMap, ColumnResolver};
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

/// A loaded export: its column map and one record per data row.
#[derive(Debug, Clone)]
pub struct ScreenTable {
    /// Resolved columns
    pub columns: ColumnMap,

    /// Records in input order
    pub records: Vec<StockRecord>,
}

impl ScreenTable {
    /// Number of data rows read.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no data rows were read.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn csv_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Load an export from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is missing
/// or the file has no data rows.
pub fn load_csv(path: &Path) -> Result<ScreenTable> {
    let source = path.display().to_string();
    if !path.exists() {
        return Err(DataError::NotFound(source));
    }

    let df = finish_read(
        csv_options()
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish(),
        &source,
    )?;
    table_from_frame(&df, &source)
}

/// Load an export from in-memory CSV bytes.
///
/// # Errors
///
/// Same conditions as [`load_csv`].
pub fn load_csv_bytes(bytes: Vec<u8>, source: &str) -> Result<ScreenTable> {
    let df = finish_read(
        csv_options()
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish(),
        source,
    )?;
    table_from_frame(&df, source)
}

fn finish_read(read: PolarsResult<DataFrame>, source: &str) -> Result<DataFrame> {
    match read {
        Ok(df) => Ok(df),
        Err(PolarsError::NoData(_)) => Err(DataError::EmptyInput {
            source_name: source.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Build records from an all-string frame.
///
/// # Errors
///
/// Returns [`DataError::MissingColumns`] when the frame lacks a required
/// column and [`DataError::EmptyInput`] when it has no rows.
pub fn table_from_frame(df: &DataFrame, source: &str) -> Result<ScreenTable> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str().to_owned())
        .collect();
    let columns = ColumnResolver::new().resolve(&headers)?;

    if df.height() == 0 {
        return Err(DataError::EmptyInput {
            source_name: source.to_string(),
        });
    }

    let mut text = HashMap::new();
    for field in Field::all() {
        if let Some(header) = columns.header(field) {
            text.insert(field, df.column(header)?.str()?);
        }
    }
    let get = |field: Field, i: usize| text.get(&field).and_then(|c| c.get(i));
    let string = |field: Field, i: usize| {
        get(field, i)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };
    let cell = |field: Field, i: usize| Cell::parse(get(field, i));

    let with_momentum = columns.has_price_changes();
    let records: Vec<StockRecord> = (0..df.height())
        .map(|i| StockRecord {
            row: i + 1,
            identity: Identity {
                company_name: string(Field::CompanyName, i),
                ticker: string(Field::Ticker, i),
                market_cap: cell(Field::MarketCap, i).value(),
                sector: string(Field::Sector, i),
                industry: string(Field::Industry, i),
                exchange: string(Field::Exchange, i),
                fiscal_year_end: string(Field::FiscalYearEnd, i),
            },
            estimates: RawEstimates {
                f0: cell(Field::F0Estimate, i),
                f1: cell(Field::F1Estimate, i),
                f2: cell(Field::F2Estimate, i),
                annual_sales: cell(Field::AnnualSales, i),
                f1_sales_estimate: cell(Field::F1SalesEstimate, i),
            },
            price_changes: if with_momentum {
                price_changes(
                    cell(Field::PriceChange1W, i),
                    cell(Field::PriceChange4W, i),
                    cell(Field::PriceChange12W, i),
                    cell(Field::PriceChangeYtd, i),
                )
            } else {
                None
            },
        })
        .collect();

    info!(
        source,
        rows = records.len(),
        momentum = with_momentum,
        "export loaded"
    );

    Ok(ScreenTable { columns, records })
}

fn price_changes(week_1: Cell, week_4: Cell, week_12: Cell, ytd: Cell) -> Option<PriceChanges> {
    Some(PriceChanges {
        week_1: week_1.value()?,
        week_4: week_4.value()?,
        week_12: week_12.value()?,
        year_to_date: ytd.value()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Company Name,Ticker,Market Cap (mil),Sector,Industry,Exchange,\
Month of Fiscal Yr End,F0 Consensus Est.,F1 Consensus Est.,F2 Consensus Est.,\
Annual Sales ($mil),F(1) Consensus Sales Est. ($mil)";

    #[test]
    fn test_load_bytes() {
        let csv = format!(
            "{HEADER}\nAcme Corp,ACME,\"1,250\",Technology,Software,NSDQ,12,2.0,2.5,3.0,100,120\n\
             Beta Inc,BETA,n/a,Finance,Banks,NYSE,6,,1.0,1.2,50,55\n"
        );
        let table = load_csv_bytes(csv.into_bytes(), "inline").unwrap();

        assert_eq!(table.len(), 2);
        let acme = &table.records[0];
        assert_eq!(acme.row, 1);
        assert_eq!(acme.identity.ticker, "ACME");
        assert_eq!(acme.identity.market_cap, Some(1250.0));
        assert_eq!(acme.estimates.f0, Cell::Value(2.0));
        assert_eq!(acme.estimates.f1_sales_estimate, Cell::Value(120.0));
        assert!(acme.price_changes.is_none());

        let beta = &table.records[1];
        assert_eq!(beta.identity.market_cap, None);
        assert_eq!(beta.estimates.f0, Cell::Missing);
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = load_csv_bytes(format!("{HEADER}\n").into_bytes(), "inline").unwrap_err();
        assert!(matches!(err, DataError::EmptyInput { .. }));
    }

    #[test]
    fn test_missing_column() {
        let csv = "Ticker,Sector\nACME,Technology\n";
        let err = load_csv_bytes(csv.as_bytes().to_vec(), "inline").unwrap_err();
        match err {
            DataError::MissingColumns { missing } => assert_eq!(missing.len(), 10),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_found() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }
}
