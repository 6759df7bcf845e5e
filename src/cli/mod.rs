//! Command-line parsing for the indicator ETL.
//!
//! Argument parsing and command dispatch stay separate from the pipeline
//! stages. Country groups and indicators are not exposed here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_END_YEAR, DEFAULT_START_YEAR, DEFAULT_TABLE,
    DEFAULT_TIMEOUT_SECS,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "econ-etl",
    version,
    about = "World Bank indicator extraction with IQR outlier flagging"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract, flag outliers, and replace the database table (default).
    Run(RunArgs),
    /// Extract and flag outliers without touching the database.
    Extract(ExtractArgs),
    /// Print the enumerated fetch tasks.
    Tasks,
}

/// Options shared by every command that hits the API.
#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Maximum number of concurrent requests.
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// First year requested (inclusive).
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Last year requested (inclusive).
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    pub end_year: i32,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// API base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Export the annotated observations to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for the full ETL run.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Destination table (replaced on every run).
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Rows per INSERT batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

/// Options for extraction without loading.
#[derive(Debug, Args, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,
}
