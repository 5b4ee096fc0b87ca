//! Screener CLI binary.
//!
//! Screens a stock export, writes the reports and ranks a sector.

use clap::{Args, Parser, Subcommand};
use screener::metrics::Metric;
use screener::output::{ExportFormat, ReportWriter};
use screener::{
    Pipeline, RankMetric, RankRequest, RankedStock, ScreenConfig, ScreenResult, SectorSummary,
    write_ranked_reports, write_screen_reports,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Screener: sales and earnings growth stock screen", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScreenArgs {
    /// CSV export to screen
    input: PathBuf,

    /// Directory for the reports
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Accepted exchange, repeatable (default: all)
    #[arg(long = "exchange")]
    exchanges: Vec<String>,

    /// Table format (csv, json or pretty-json)
    #[arg(long, default_value = "csv")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen an export and write the filtered, flagged and sector reports
    Process {
        #[command(flatten)]
        args: ScreenArgs,
    },

    /// Rank the top stocks of a sector
    Rank {
        #[command(flatten)]
        args: ScreenArgs,

        /// Sector to rank
        #[arg(long)]
        sector: String,

        /// Z-score tolerance inside the sector
        #[arg(long, default_value = "3.0")]
        tolerance: f64,

        /// Share of the sector to keep, in percent
        #[arg(long, default_value = "10")]
        top: f64,

        /// Ordering value (composite, sg-f1, eg-f1, eg-f2 or momentum)
        #[arg(long, default_value = "composite")]
        metric: String,
    },

    /// List the sectors of the filtered stocks
    Sectors {
        #[command(flatten)]
        args: ScreenArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Process { args } => {
            let (pipeline, result) = screen(&args)?;
            let format: ExportFormat = args.format.parse()?;
            let writer = ReportWriter::new(&args.output, format)?;
            let paths = write_screen_reports(&result, pipeline.config(), &writer)?;

            println!("{}", result.summary.to_ascii_table());
            println!("{}", sectors_table(&result.sectors));
            print_paths(&paths);
        }
        Commands::Rank {
            args,
            sector,
            tolerance,
            top,
            metric,
        } => {
            let request = RankRequest::new(sector)
                .with_tolerance(tolerance)
                .with_top_percent(top)
                .with_metric(metric.parse::<RankMetric>()?);
            request.validate()?;

            let (pipeline, result) = screen(&args)?;
            let ranked = pipeline.rank(&result, &request)?;
            let format: ExportFormat = args.format.parse()?;
            let writer = ReportWriter::new(&args.output, format)?;
            let paths = write_ranked_reports(&request.sector, &ranked, &writer)?;

            println!("{}", ranked_table(&request, &ranked));
            print_paths(&paths);
        }
        Commands::Sectors { args } => {
            let (_, result) = screen(&args)?;
            println!("{}", sectors_table(&result.sectors));
        }
    }

    Ok(())
}

fn screen(args: &ScreenArgs) -> Result<(Pipeline, ScreenResult), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let config = if args.exchanges.is_empty() {
        config
    } else {
        config.with_exchanges(args.exchanges.clone())
    };

    let pipeline = Pipeline::new(config)?;
    info!(input = %args.input.display(), "screening");
    let result = pipeline.run_file(&args.input)?;
    Ok((pipeline, result))
}

fn load_config(path: Option<&Path>) -> Result<ScreenConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "loading configuration");
            Ok(ScreenConfig::from_toml_file(path)?)
        }
        None => Ok(ScreenConfig::default()),
    }
}

fn sectors_table(sectors: &[SectorSummary]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<36} {:>10} {:>10} {:>10} {:>8}\n",
        "Sector", "SG-F1", "EG-F1", "EG-F2", "Stocks"
    ));
    output.push_str(&"=".repeat(78));
    output.push('\n');
    for summary in sectors {
        output.push_str(&format!(
            "{:<36} {:>10.4} {:>10.4} {:>10.4} {:>8}\n",
            summary.sector,
            summary.mean(Metric::SalesGrowthF1),
            summary.mean(Metric::EarningsGrowthF1),
            summary.mean(Metric::EarningsGrowthF2),
            summary.count
        ));
    }
    if sectors.is_empty() {
        output.push_str("(no stocks survived the filters)\n");
    }
    output
}

fn ranked_table(request: &RankRequest, ranked: &[RankedStock]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\nTop {}% of {} by {} (tolerance {})\n",
        request.top_percent, request.sector, request.metric, request.tolerance
    ));
    output.push_str(&format!(
        "{:>4}  {:<8} {:<32} {:>10} {:>10} {:>10} {:>10}\n",
        "Rank", "Ticker", "Company", "SG-F1", "EG-F1", "EG-F2", "Score"
    ));
    output.push_str(&"=".repeat(92));
    output.push('\n');
    for entry in ranked {
        output.push_str(&format!(
            "{:>4}  {:<8} {:<32} {:>10.4} {:>10.4} {:>10.4} {:>10.4}\n",
            entry.rank,
            entry.stock.ticker(),
            truncate(&entry.stock.identity.company_name, 32),
            entry.stock.value(Metric::SalesGrowthF1),
            entry.stock.value(Metric::EarningsGrowthF1),
            entry.stock.value(Metric::EarningsGrowthF2),
            entry.score
        ));
    }
    output
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn print_paths(paths: &[PathBuf]) {
    println!("Reports written:");
    for path in paths {
        println!("  {}", path.display());
    }
}
