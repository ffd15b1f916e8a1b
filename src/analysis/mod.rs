//! Aggregation of part hierarchies into the consolidated document.

pub mod aggregator;

pub use aggregator::*;
