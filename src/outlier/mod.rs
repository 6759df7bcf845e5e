//! Statistical outlier flagging.
//!
//! Responsibilities:
//!
//! - partition observations by indicator
//! - compute IQR fences per partition (parallel)
//! - flag every record against its own partition's fences

pub mod iqr;

pub use iqr::*;
