//! Portfolio Analyzer CLI - analyze a holdings file against live market data.
//!
//! Logs go to stderr; the report goes to stdout as text or JSON.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use portfolio_analyzer_core::errors::CoreError;
use portfolio_analyzer_core::models::settings::AnalyzerSettings;
use portfolio_analyzer_core::PortfolioAnalyzer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "portfolio-analyzer")]
#[command(about = "Live valuation, risk and benchmark analysis of a stock portfolio")]
#[command(version)]
struct Cli {
    /// Holdings file (.csv, .tsv, .xlsx, .xls, .ods) with columns Symbol, Quantity, BuyPrice, BuyDate
    file: PathBuf,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Benchmark index ticker (overrides the settings file)
    #[arg(short, long)]
    benchmark: Option<String>,

    /// Valuation date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_settings(cli: &Cli) -> Result<AnalyzerSettings, CoreError> {
    let mut settings = match &cli.config {
        Some(path) => AnalyzerSettings::from_file(path)?,
        None => AnalyzerSettings::default(),
    };
    if let Some(benchmark) = &cli.benchmark {
        settings.benchmark_symbol = benchmark.clone();
        settings.benchmark_name = benchmark.clone();
    }
    settings.validate()?;
    Ok(settings)
}

async fn run(cli: Cli) -> Result<String, CoreError> {
    let settings = load_settings(&cli)?;
    let analyzer = PortfolioAnalyzer::new(settings)?;
    tracing::debug!(?analyzer, "analyzer ready");

    let bytes = std::fs::read(&cli.file)?;
    let file_name = cli
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let report = analyzer.analyze_upload(file_name, &bytes, as_of).await?;

    if cli.json {
        report.to_json()
    } else {
        Ok(render::render_report(&report, analyzer.settings()))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "analysis failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
