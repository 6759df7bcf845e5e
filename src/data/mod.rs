//! Extraction: task enumeration, World Bank client, bounded fetch pool, and
//! result aggregation.

pub mod aggregate;
pub mod fetcher;
pub mod tasks;
pub mod worldbank;

pub use aggregate::*;
pub use fetcher::*;
pub use tasks::*;
pub use worldbank::*;
