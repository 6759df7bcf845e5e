//! Shared domain types.
//!
//! Observations are plain owned rows so they can be moved between pipeline
//! stages, exported to CSV, and bound into SQL parameters without conversion.

use serde::Serialize;

/// One unit of extraction work: a single (country, indicator) request.
///
/// Group membership is part of the task identity, so the same country listed
/// in two groups produces two distinct tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTask {
    pub country_code: String,
    pub country_group: String,
    pub indicator_code: String,
    pub indicator_name: String,
}

/// One (country, indicator, year) data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Display name reported by the API.
    pub country: String,
    pub country_code: String,
    pub country_group: String,
    pub indicator_code: String,
    pub indicator_name: String,
    pub year: i32,
    pub value: f64,
    /// Set by the outlier pass; `false` until then.
    pub is_outlier: bool,
}

impl Observation {
    /// Build an unflagged observation for `task`.
    pub fn from_task(task: &FetchTask, country: impl Into<String>, year: i32, value: f64) -> Self {
        Self {
            country: country.into(),
            country_code: task.country_code.clone(),
            country_group: task.country_group.clone(),
            indicator_code: task.indicator_code.clone(),
            indicator_name: task.indicator_name.clone(),
            year,
            value,
            is_outlier: false,
        }
    }
}

/// Ordered collection of observations produced by one run.
///
/// Order is the merge order of task batches and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    rows: Vec<Observation>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one task's batch as a unit.
    pub fn append_batch(&mut self, batch: Vec<Observation>) {
        self.rows.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.rows
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Observation] {
        &mut self.rows
    }

    pub fn outlier_count(&self) -> usize {
        self.rows.iter().filter(|o| o.is_outlier).count()
    }
}

impl From<Vec<Observation>> for ObservationSet {
    fn from(rows: Vec<Observation>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// IQR fences computed for one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBounds {
    pub indicator_code: String,
    /// Number of records the quartiles were computed over.
    pub count: usize,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub outliers: usize,
}
