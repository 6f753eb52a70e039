//! Crawler module for the two harvest stages
//!
//! This module contains:
//! - HTTP fetching shared by both stages
//! - Random-probe discovery of valid film URLs
//! - Resumable extraction of structured records from discovered pages

mod discovery;
mod extraction;
mod fetcher;

pub use discovery::{
    classify_probe, Discovery, DiscoveryLimits, DiscoveryOutput, IdSource, RandomIds,
};
pub use extraction::{load_input, Extraction};
pub use fetcher::{build_http_client, fetch_url, FetchResult};

use crate::config::Config;
use crate::state::ExtractionReport;
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs the discovery stage with the configured limits and checkpoint file
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `fresh` - Ignore URLs already in the checkpoint
/// * `cancel` - Stops the run at the next attempt boundary
pub async fn discover(
    config: &Config,
    fresh: bool,
    cancel: CancellationToken,
) -> Result<DiscoveryOutput, HarvestError> {
    Discovery::from_config(config, cancel)?.run(fresh).await
}

/// Runs the extraction stage over the configured input and record files
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `cancel` - Stops the run between two record writes
pub async fn extract(
    config: &Config,
    cancel: CancellationToken,
) -> Result<ExtractionReport, HarvestError> {
    Extraction::from_config(config, cancel)?.run().await
}
