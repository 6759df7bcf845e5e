//! Shared ETL pipeline used by the `run` and `extract` commands.
//!
//! Stages are strict barriers:
//! enumerate -> fetch all (bounded pool) -> aggregate -> flag outliers -> load
//!
//! Each stage starts only after the previous one has fully settled.

use chrono::{DateTime, Utc};

use crate::config::PipelineConfig;
use crate::data::{Extraction, JsonSource, aggregate, enumerate_tasks, fetch_all};
use crate::domain::{FetchTask, IndicatorBounds};
use crate::error::AppError;
use crate::outlier::flag_outliers;
use crate::sink::TableSink;

/// Everything computed by one run, before loading.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub started_at: DateTime<Utc>,
    pub tasks: Vec<FetchTask>,
    /// Observations here already carry their outlier flags.
    pub extraction: Extraction,
    pub bounds: Vec<IndicatorBounds>,
}

/// Extract and annotate; no database involved.
pub fn run_extract<S: JsonSource + ?Sized>(config: &PipelineConfig, source: &S) -> Result<RunOutput, AppError> {
    config.validate()?;
    let started_at = Utc::now();

    // 1) Enumerate tasks.
    let tasks = enumerate_tasks(&config.country_groups, &config.indicators);
    log::info!(
        "Starting extraction for {} endpoints ({} workers)...",
        tasks.len(),
        config.concurrency
    );

    // 2) Fetch everything, then merge on this thread.
    let outcomes = fetch_all(source, &tasks, config)?;
    let mut extraction = aggregate(outcomes);
    log::info!(
        "Extracted {} rows ({} of {} tasks failed).",
        extraction.observations.len(),
        extraction.stats.failed,
        extraction.stats.tasks
    );

    // 3) Flag outliers per indicator.
    log::info!("Detecting statistical outliers...");
    let bounds = flag_outliers(&mut extraction.observations);
    log::info!("Flagged {} outliers.", extraction.observations.outlier_count());

    Ok(RunOutput {
        started_at,
        tasks,
        extraction,
        bounds,
    })
}

/// Replace the configured table with the run's observations.
pub fn load<K: TableSink + ?Sized>(run: &RunOutput, sink: &mut K, config: &PipelineConfig) -> Result<usize, AppError> {
    log::info!("Loading data to {} table '{}'...", sink.backend_type(), config.table);
    let written = sink.replace_table(&config.table, &run.extraction.observations)?;
    log::info!("Data successfully loaded ({written} rows).");
    Ok(written)
}

/// Full ETL: extract, annotate, load.
pub fn run_etl<S, K>(config: &PipelineConfig, source: &S, sink: &mut K) -> Result<RunOutput, AppError>
where
    S: JsonSource + ?Sized,
    K: TableSink + ?Sized,
{
    let run = run_extract(config, source)?;
    load(&run, sink, config)?;
    Ok(run)
}
