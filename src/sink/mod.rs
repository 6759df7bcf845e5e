//! Loading the annotated observations into a relational store.

pub mod sqlite;

pub use sqlite::*;

use crate::domain::ObservationSet;
use crate::error::AppError;

/// Destination for a finished run.
pub trait TableSink {
    /// Replace the full contents of `table` with `rows`; returns rows written.
    fn replace_table(&mut self, table: &str, rows: &ObservationSet) -> Result<usize, AppError>;

    fn backend_type(&self) -> &'static str;
}
