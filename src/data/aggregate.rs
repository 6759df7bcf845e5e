//! Merge per-task outcomes into one observation set.
//!
//! Runs on the coordinating thread once the fetch pool has settled. Failures
//! are logged and kept for the report; they never fail the run.

use crate::data::fetcher::{TaskFailure, TaskOutcome};
use crate::domain::ObservationSet;

/// Run counters for the extraction phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub observations: usize,
    pub null_values: usize,
    pub rejected_entries: usize,
}

/// Aggregated result of the extraction phase.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub observations: ObservationSet,
    pub stats: ExtractStats,
    pub failures: Vec<TaskFailure>,
}

pub fn aggregate(outcomes: Vec<TaskOutcome>) -> Extraction {
    let mut out = Extraction::default();
    out.stats.tasks = outcomes.len();

    for outcome in outcomes {
        match outcome {
            Ok(batch) => {
                out.stats.succeeded += 1;
                out.stats.null_values += batch.null_values;
                out.stats.rejected_entries += batch.rejected;
                out.observations.append_batch(batch.observations);
            }
            Err(failure) => {
                log::warn!("{failure}");
                out.stats.failed += 1;
                out.failures.push(failure);
            }
        }
    }

    out.stats.observations = out.observations.len();
    out
}
