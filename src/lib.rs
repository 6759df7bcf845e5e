//! `econ-etl` library crate.
//!
//! The binary (`econ-etl`) is a thin wrapper around this library so that:
//!
//! - pipeline stages are testable without network or database access
//! - the fetch transport and the sink can be swapped behind traits

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod outlier;
pub mod report;
pub mod sink;
