//! Interquartile-range fences.
//!
//! A value is an outlier when it lies strictly outside
//! `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]`, with quartiles computed over every
//! record sharing its indicator code (all countries, years, and groups).
//! There is no minimum sample size: one record gives `Q1 = Q3 = V` and is
//! never flagged, while identical values flag anything that differs.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::domain::{IndicatorBounds, ObservationSet};
use crate::math::quartiles;

pub const IQR_MULTIPLIER: f64 = 1.5;

/// Fences for one indicator's values. `None` if `values` is empty.
pub fn iqr_bounds(indicator_code: &str, values: &[f64]) -> Option<IndicatorBounds> {
    let (q1, q3) = quartiles(values)?;
    let iqr = q3 - q1;
    Some(IndicatorBounds {
        indicator_code: indicator_code.to_string(),
        count: values.len(),
        q1,
        q3,
        iqr,
        lower: q1 - IQR_MULTIPLIER * iqr,
        upper: q3 + IQR_MULTIPLIER * iqr,
        outliers: 0,
    })
}

impl IndicatorBounds {
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Set `is_outlier` on every observation; returns the fences per indicator,
/// sorted by indicator code.
///
/// Flags are assigned, not accumulated, so repeated calls agree.
pub fn flag_outliers(set: &mut ObservationSet) -> Vec<IndicatorBounds> {
    let mut partitions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, obs) in set.iter().enumerate() {
        partitions.entry(obs.indicator_code.clone()).or_default().push(idx);
    }

    let rows = set.as_slice();
    let fenced: Vec<(IndicatorBounds, Vec<usize>)> = partitions
        .into_par_iter()
        .filter_map(|(code, indices)| {
            let values: Vec<f64> = indices.iter().map(|&i| rows[i].value).collect();
            iqr_bounds(&code, &values).map(|bounds| (bounds, indices))
        })
        .collect();

    let rows = set.as_mut_slice();
    let mut out = Vec::with_capacity(fenced.len());
    for (mut bounds, indices) in fenced {
        for i in indices {
            let flagged = bounds.is_outlier(rows[i].value);
            rows[i].is_outlier = flagged;
            if flagged {
                bounds.outliers += 1;
            }
        }
        log::debug!(
            "{}: n={} Q1={:.4} Q3={:.4} fences=[{:.4}, {:.4}] outliers={}",
            bounds.indicator_code,
            bounds.count,
            bounds.q1,
            bounds.q3,
            bounds.lower,
            bounds.upper,
            bounds.outliers
        );
        out.push(bounds);
    }

    out
}
