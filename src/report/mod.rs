//! Terminal reporting for a finished run.

pub mod format;

pub use format::*;
