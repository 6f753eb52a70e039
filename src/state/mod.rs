//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `ProbeOutcome`: how a single discovery probe was classified
//! - `DiscoveryReport` / `ExtractionReport`: per-run counters logged at the end of each stage

mod probe_outcome;
mod report;

// Re-export main types
pub use probe_outcome::ProbeOutcome;
pub use report::{DiscoveryReport, ExtractionReport};
