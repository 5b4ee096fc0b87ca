//! End-to-end tests of the screening pipeline.

use approx::assert_relative_eq;
use screener::metrics::{ExclusionKind, Metric};
use screener::output::{ExportFormat, ReportWriter};
use screener::{
    Pipeline, RankMetric, RankRequest, ScreenConfig, write_ranked_reports, write_screen_reports,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Columns in a shuffled order with loosely formatted labels.
const HEADER: &str = "ticker,Sector,F1 Consensus Est.,company name,F0_Consensus_Est,\
Industry,Exchange,Market Cap (mil),Month of Fiscal Yr End,F2 Consensus Est.,\
Annual Sales ($mil),F(1) Consensus Sales Est. ($mil)";

fn row(ticker: &str, sector: &str, f0: f64, f1: f64, f2: f64, sales: f64, est: f64) -> String {
    format!(
        "{ticker},{sector},{f1},{ticker} Inc,{f0},Software,NYSE,\"$1,000\",12,{f2},{sales},{est}"
    )
}

fn screen_csv() -> String {
    let mut rows = vec![HEADER.to_string()];
    for i in 0..10 {
        let growth = 1.0 + 0.02 * i as f64;
        let (f1, f2) = (2.0 * growth, 2.0 * growth * growth);
        rows.push(row(&format!("T{i}"), "Technology", 2.0, f1, f2, 100.0, 100.0 * growth));
    }
    for i in 0..6 {
        let growth = 1.0 + 0.01 * i as f64;
        let (f1, f2) = (growth, growth * 1.01);
        rows.push(row(&format!("U{i}"), "Utilities", 1.0, f1, f2, 50.0, 50.0 * growth));
    }
    // Loss to profit: EG-F1 is flagged 99.
    rows.push(row("FLIP", "Technology", -5.0, 10.0, 12.0, 100.0, 120.0));
    // Profit to loss in F2: EG-F2 is flagged -99.
    rows.push(row("DROP", "Utilities", 1.0, 1.2, -0.5, 50.0, 52.0));
    // Real ratio of -100.
    rows.push(row("SINK", "Technology", 1.0, 1.1, 1.2, 1.0, -99.0));
    // Far outside the sales growth distribution.
    rows.push(row("ROCKET", "Technology", 2.0, 2.1, 2.2, 10.0, 500.0));
    // Invalid rows.
    rows.push(row("ZERO", "Technology", 0.0, 1.0, 1.1, 100.0, 110.0));
    rows.push("MISS,Technology,,Missing Inc,1,Software,NYSE,10,12,1.2,100,110".to_string());
    rows.push("TEXT,Technology,1.1,Text Inc,1,Software,NYSE,10,12,1.2,n/a,110".to_string());
    rows.join("\n") + "\n"
}

fn write_input(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("screen.csv");
    fs::write(&path, screen_csv()).unwrap();
    path
}

#[test]
fn test_partition_of_validated_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path());
    let result = Pipeline::new(ScreenConfig::default())
        .unwrap()
        .run_file(&input)
        .unwrap();

    let summary = &result.summary;
    assert_eq!(summary.rows_read, 23);
    assert_eq!(summary.excluded(ExclusionKind::DivisionByZero), 1);
    assert_eq!(summary.excluded(ExclusionKind::MissingValue), 1);
    assert_eq!(summary.excluded(ExclusionKind::NotNumeric), 1);
    assert_eq!(summary.excluded_total() + summary.validated(), summary.rows_read);

    let outliers = &result.outliers;
    let tickers = |stocks: &[screener::metrics::EvaluatedStock]| -> Vec<String> {
        stocks.iter().map(|s| s.ticker().to_string()).collect()
    };
    assert_eq!(tickers(&outliers.flagged_99), vec!["FLIP"]);
    assert_eq!(tickers(&outliers.flagged_neg99), vec!["DROP"]);
    assert_eq!(tickers(&outliers.flagged_neg100), vec!["SINK"]);
    assert_eq!(outliers.extreme.len(), 1);
    assert_eq!(outliers.extreme[0].stock.ticker(), "ROCKET");

    let mut seen = HashSet::new();
    for ticker in tickers(&outliers.retained)
        .into_iter()
        .chain(tickers(&outliers.flagged_99))
        .chain(tickers(&outliers.flagged_neg99))
        .chain(tickers(&outliers.flagged_neg100))
        .chain(outliers.extreme.iter().map(|e| e.stock.ticker().to_string()))
    {
        assert!(seen.insert(ticker), "row reported twice");
    }
    assert_eq!(seen.len(), 20);
    assert!(!seen.contains("ZERO"));
}

#[test]
fn test_metrics_and_market_cap_coercion() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path());
    let result = Pipeline::new(ScreenConfig::default())
        .unwrap()
        .run_file(&input)
        .unwrap();

    let t3 = result
        .filtered()
        .iter()
        .find(|s| s.ticker() == "T3")
        .unwrap();
    assert_relative_eq!(t3.value(Metric::SalesGrowthF1), 0.06, epsilon = 1e-9);
    assert_relative_eq!(t3.value(Metric::EarningsGrowthF1), 0.06, epsilon = 1e-9);
    assert_eq!(t3.identity.market_cap, Some(1000.0));
    assert_eq!(t3.identity.company_name, "T3 Inc");
}

#[test]
fn test_sector_averages() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path());
    let result = Pipeline::new(ScreenConfig::default())
        .unwrap()
        .run_file(&input)
        .unwrap();

    let names: Vec<&str> = result.sectors.iter().map(|s| s.sector.as_str()).collect();
    assert_eq!(names, vec!["Technology", "Utilities"]);

    let tech = result.sector("technology").unwrap();
    assert_eq!(tech.count, 10);
    assert_relative_eq!(tech.mean(Metric::SalesGrowthF1), 0.09, epsilon = 1e-9);

    let utilities = result.sector("Utilities").unwrap();
    assert_eq!(utilities.count, 6);
    assert_relative_eq!(utilities.mean(Metric::SalesGrowthF1), 0.025, epsilon = 1e-9);
}

#[test]
fn test_reports_written() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path());
    let pipeline = Pipeline::new(ScreenConfig::default()).unwrap();
    let result = pipeline.run_file(&input).unwrap();

    let writer = ReportWriter::new(tmp.path().join("out"), ExportFormat::Csv).unwrap();
    let paths = write_screen_reports(&result, pipeline.config(), &writer).unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "filtered_stock_data.csv",
            "stocks_99.csv",
            "stocks_neg99.csv",
            "stocks_neg100.csv",
            "extreme_valued_stocks.csv",
            "sector_averages.csv",
            "sector_averages_colored.xlsx",
        ]
    );

    let sectors = fs::read_to_string(&paths[5]).unwrap();
    assert!(sectors.starts_with("Sector,SG-F1,EG-F1,EG-F2,Stocks Count"));
    assert!(sectors.contains("Utilities"));

    let filtered = fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(filtered.lines().count(), 17);
}

#[test]
fn test_rank_sector() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path());
    let pipeline = Pipeline::new(ScreenConfig::default()).unwrap();
    let result = pipeline.run_file(&input).unwrap();

    let request = RankRequest::new("technology").with_top_percent(20.0);
    let ranked = pipeline.rank(&result, &request).unwrap();
    let tickers: Vec<&str> = ranked.iter().map(|r| r.stock.ticker()).collect();
    assert_eq!(tickers, vec!["T9", "T8"]);
    assert!(ranked[0].flags(Metric::SalesGrowthF1).above_average);
    assert!(ranked[1].flags(Metric::SalesGrowthF1).column_minimum);

    let writer = ReportWriter::new(tmp.path(), ExportFormat::Csv).unwrap();
    let paths = write_ranked_reports("Technology", &ranked, &writer).unwrap();
    assert!(paths[0].ends_with("top_stocks_technology.csv"));
    assert!(paths[1].ends_with("top_stocks_technology.xlsx"));

    let by_eg2 = pipeline
        .rank(&result, &request.clone().with_metric(RankMetric::EarningsGrowthF2))
        .unwrap();
    assert_eq!(by_eg2.len(), 2);
    assert_eq!(by_eg2[0].stock.ticker(), "T9");
}

#[test]
fn test_exchange_allow_list() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path());
    let config = ScreenConfig::default().with_exchanges(vec!["NSDQ".to_string()]);
    let result = Pipeline::new(config).unwrap().run_file(&input).unwrap();

    assert_eq!(result.summary.excluded_exchange, 23);
    assert!(result.filtered().is_empty());
    assert!(result.sectors.is_empty());
}

#[test]
fn test_missing_column_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("broken.csv");
    fs::write(&path, "Ticker,Sector\nAAA,Tech\n").unwrap();

    let err = Pipeline::new(ScreenConfig::default())
        .unwrap()
        .run_file(&path)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("F0 Consensus Est."));
    assert!(message.contains("Company Name"));
}
