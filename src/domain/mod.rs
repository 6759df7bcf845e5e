//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - extraction work units (`FetchTask`)
//! - extracted records and their container (`Observation`, `ObservationSet`)
//! - per-indicator detection results (`IndicatorBounds`)

pub mod types;

pub use types::*;
