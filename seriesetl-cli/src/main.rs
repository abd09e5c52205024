//! SeriesETL CLI: weather and stock price pipeline runs.
//!
//! Commands:
//! - `weather`: fetch daily weather for a point, store as CSV and SQLite, chart it
//! - `stocks`: fetch recent daily prices per symbol, store per-symbol CSVs and
//!   one consolidated SQLite table, chart closing prices
//! - `all`: both, in sequence

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seriesetl_chart::TerminalChartRenderer;
use seriesetl_core::data::{OpenMeteoProvider, YahooProvider};
use seriesetl_core::ChartRenderer;
use seriesetl_runner::{
    run_stocks, run_weather, PipelineConfig, StdoutProgress, StocksConfig, WeatherConfig,
};

#[derive(Parser)]
#[command(
    name = "seriesetl",
    about = "SeriesETL: fetch, normalize, store and chart daily time series"
)]
struct Cli {
    /// Path to a TOML config file. Built-in defaults apply otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip chart rendering.
    #[arg(long, global = true, default_value_t = false)]
    no_charts: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily weather observations for a point and date range.
    Weather {
        #[arg(long, allow_negative_numbers = true)]
        latitude: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        longitude: Option<f64>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Directory for the CSV file.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// CSV file name.
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Fetch recent daily prices for one or more symbols.
    Stocks {
        /// Symbols to fetch (e.g., AAPL TSLA MSFT). Defaults to the configured list.
        symbols: Vec<String>,

        /// Trailing window in days.
        #[arg(long)]
        lookback_days: Option<u32>,
    },
    /// Run the weather pipeline, then the stocks pipeline.
    All,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Weather {
            latitude,
            longitude,
            start,
            end,
            output_dir,
            file_name,
        } => {
            let w = &mut config.weather;
            if let Some(v) = latitude {
                w.latitude = v;
            }
            if let Some(v) = longitude {
                w.longitude = v;
            }
            if let Some(v) = parse_date(start.as_deref())? {
                w.start = v;
            }
            if let Some(v) = parse_date(end.as_deref())? {
                w.end = v;
            }
            if let Some(v) = output_dir {
                w.output_dir = v;
            }
            if let Some(v) = file_name {
                w.file_name = v;
            }
            config.validate()?;
            weather_cmd(&config.weather, cli.no_charts)
        }
        Commands::Stocks {
            symbols,
            lookback_days,
        } => {
            if !symbols.is_empty() {
                config.stocks.symbols = symbols;
            }
            if let Some(v) = lookback_days {
                config.stocks.lookback_days = v;
            }
            config.validate()?;
            stocks_cmd(&config.stocks, cli.no_charts)
        }
        Commands::All => {
            weather_cmd(&config.weather, cli.no_charts)?;
            stocks_cmd(&config.stocks, cli.no_charts)
        }
    }
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")
}

fn weather_cmd(config: &WeatherConfig, no_charts: bool) -> Result<()> {
    let provider = OpenMeteoProvider::new()?;
    let mut renderer = TerminalChartRenderer::new(io::stdout());
    let renderer = (!no_charts).then_some(&mut renderer as &mut dyn ChartRenderer);

    match run_weather(&provider, config, &StdoutProgress, renderer)? {
        Some(outcome) => println!(
            "Weather: {} rows, {} charts",
            outcome.rows_written, outcome.charts_rendered
        ),
        None => println!("Weather: nothing stored"),
    }
    Ok(())
}

fn stocks_cmd(config: &StocksConfig, no_charts: bool) -> Result<()> {
    let provider = YahooProvider::new()?;
    let mut renderer = TerminalChartRenderer::new(io::stdout());
    let renderer = (!no_charts).then_some(&mut renderer as &mut dyn ChartRenderer);

    let report = run_stocks(&provider, config, &StdoutProgress, renderer)?;

    println!("Succeeded: {}", report.succeeded().join(", "));
    for skipped in &report.skipped {
        println!("Skipped {}: {}", skipped.symbol, skipped.reason);
    }
    match report.rows_written {
        Some(rows) => println!("Stocks: {rows} rows in {}", config.table),
        None => println!("Stocks: no symbol succeeded, nothing stored"),
    }
    Ok(())
}
