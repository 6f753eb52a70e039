//! Output module for summarizing harvest results
//!
//! This module reads the checkpoint and record files back and reports how far
//! the harvest has progressed and how complete the extracted fields are.

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};
