//! Input/output helpers.
//!
//! - annotated observation export (CSV) (`export`)

pub mod export;

pub use export::*;
