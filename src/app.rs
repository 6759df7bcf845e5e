//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the run configuration
//! - runs the extraction pipeline
//! - loads the database table and writes optional exports
//! - prints the run summary

use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, FetchArgs, RunArgs};
use crate::config::{DatabaseConfig, PipelineConfig, YearRange};
use crate::data::{WorldBankClient, enumerate_tasks};
use crate::error::AppError;
use crate::sink::SqliteSink;

pub mod pipeline;

/// Entry point for the `econ-etl` binary.
pub fn run() -> Result<(), AppError> {
    // `econ-etl` and `econ-etl -j 8` behave like `econ-etl run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Extract(args) => handle_extract(args.fetch),
        Command::Tasks => handle_tasks(),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let mut config = pipeline_config_from_args(&args.fetch)?;
    config.table = args.table;
    config.batch_size = args.batch_size;
    config.validate()?;

    // Credentials are checked before any request is made.
    let db = DatabaseConfig::from_env()?;
    let source = WorldBankClient::new(config.request_timeout)?;

    let run = pipeline::run_extract(&config, &source)?;
    write_export(&args.fetch, &run)?;

    let mut sink = SqliteSink::connect(&db, config.batch_size)?;
    pipeline::load(&run, &mut sink, &config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    Ok(())
}

fn handle_extract(args: FetchArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args)?;
    config.validate()?;
    let source = WorldBankClient::new(config.request_timeout)?;

    let run = pipeline::run_extract(&config, &source)?;
    write_export(&args, &run)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    Ok(())
}

fn handle_tasks() -> Result<(), AppError> {
    let config = PipelineConfig::default();
    let tasks = enumerate_tasks(&config.country_groups, &config.indicators);
    print!("{}", crate::report::format_task_list(&tasks));
    Ok(())
}

fn write_export(args: &FetchArgs, run: &pipeline::RunOutput) -> Result<(), AppError> {
    if let Some(path) = &args.export {
        crate::io::export::write_observations_csv(path, &run.extraction.observations)?;
        log::info!("Exported {} rows to {}", run.extraction.observations.len(), path.display());
    }
    Ok(())
}

/// Built-in configuration with the CLI overrides applied.
pub fn pipeline_config_from_args(args: &FetchArgs) -> Result<PipelineConfig, AppError> {
    Ok(PipelineConfig {
        years: YearRange::new(args.start_year, args.end_year)?,
        concurrency: args.concurrency,
        request_timeout: Duration::from_secs(args.timeout),
        base_url: args.base_url.clone(),
        ..PipelineConfig::default()
    })
}

/// A bare invocation, or one starting with a run flag, becomes `run`.
/// Top-level help and version flags pass through.
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let needs_run = match argv.get(1).map(String::as_str) {
        None => true,
        Some("-h" | "--help" | "-V" | "--version") => false,
        Some(arg) => arg.starts_with('-'),
    };
    if needs_run {
        argv.insert(1.min(argv.len()), "run".to_string());
    }
    argv
}
