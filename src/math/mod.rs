//! Mathematical utilities: order-statistic quantiles.

pub mod quantile;

pub use quantile::*;
