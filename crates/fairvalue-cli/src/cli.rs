use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::LogLevel;

/// Earnings-based fair value curves for publicly traded stocks.
#[derive(Debug, Parser)]
#[command(name = "fairvalue", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info", env = "FAIRVALUE_LOG_LEVEL")]
    pub(crate) log_level: LogLevel,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Fetch data, compute fair values and write one Parquet file per ticker
    Run(RunArgs),
    /// Print a Parquet file written by `run`
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    /// Ticker symbols to value
    #[arg(required = true, value_name = "TICKER")]
    pub(crate) tickers: Vec<String>,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub(crate) start: Option<String>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub(crate) end: Option<String>,

    /// Directory the Parquet files are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub(crate) output_dir: PathBuf,

    /// Use the mock API server on localhost:8080 instead of Alpha Vantage
    #[arg(long)]
    pub(crate) mock_api: bool,

    /// API keys file (TOML)
    #[arg(long, value_name = "FILE", env = "API_KEYS_CONFIG_PATH")]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Parquet file to read
    #[arg(value_name = "FILE")]
    pub(crate) file: PathBuf,

    /// Print records as JSON
    #[arg(long)]
    pub(crate) json: bool,
}
