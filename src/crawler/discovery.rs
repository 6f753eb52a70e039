//! Random-probe discovery
//!
//! Valid film identifiers are sparse and unindexed, so discovery draws random
//! identifiers, probes the matching URL, and keeps the ones that lead to a real
//! detail page. The loop is bounded by two independent counters: it stops when
//! `found` reaches the target or `attempts` exhausts the budget, and every
//! iteration consumes one attempt.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::state::{DiscoveryReport, ProbeOutcome};
use crate::storage::{CsvUrlCheckpoint, UrlCheckpoint};
use crate::url::CatalogUrls;
use crate::{ConfigError, HarvestError};
use rand::Rng;
use reqwest::Client;
use std::collections::{BTreeSet, HashSet};
use tokio_util::sync::CancellationToken;

/// Source of candidate identifiers
pub trait IdSource {
    /// Draws an identifier in `1..=id_space`
    fn next_id(&mut self, id_space: u64) -> u64;
}

/// Uniform random identifiers from the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self, id_space: u64) -> u64 {
        rand::rng().random_range(1..=id_space)
    }
}

/// Limits for one discovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryLimits {
    /// Stop once this many URLs are held
    pub target_count: usize,

    /// Hard ceiling on loop iterations
    pub max_attempts: u64,

    /// Upper bound of the identifier space
    pub id_space: u64,
}

/// Everything a discovery run produced
#[derive(Debug, Clone)]
pub struct DiscoveryOutput {
    pub urls: BTreeSet<String>,
    pub report: DiscoveryReport,
}

/// Classifies a probe response
///
/// In order: network failure, non-200 status, a not-found marker in the body,
/// a final URL that is not a detail page; anything left is valid.
pub fn classify_probe(result: FetchResult, urls: &CatalogUrls, markers: &[String]) -> ProbeOutcome {
    match result {
        FetchResult::NetworkError { error } => ProbeOutcome::FetchError { error },
        FetchResult::Response { status_code, .. } if status_code != 200 => {
            ProbeOutcome::BadStatus { status_code }
        }
        FetchResult::Response { body, .. }
            if markers.iter().any(|marker| body.contains(marker.as_str())) =>
        {
            ProbeOutcome::NotFound
        }
        FetchResult::Response { final_url, .. } if !urls.is_detail_page(&final_url) => {
            ProbeOutcome::ShapeMismatch { final_url }
        }
        FetchResult::Response { final_url, .. } => ProbeOutcome::Valid { final_url },
    }
}

/// Discovery engine
pub struct Discovery<C: UrlCheckpoint> {
    limits: DiscoveryLimits,
    checkpoint_every: u64,
    markers: Vec<String>,
    urls: CatalogUrls,
    client: Client,
    checkpoint: C,
    ids: Box<dyn IdSource + Send>,
    cancel: CancellationToken,
}

impl Discovery<CsvUrlCheckpoint> {
    /// Creates an engine that checkpoints to the configured discovery output
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self, HarvestError> {
        let checkpoint = CsvUrlCheckpoint::new(&config.discovery.output_path);
        Self::new(config, checkpoint, cancel)
    }
}

impl<C: UrlCheckpoint> Discovery<C> {
    pub fn new(
        config: &Config,
        checkpoint: C,
        cancel: CancellationToken,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            limits: DiscoveryLimits {
                target_count: config.discovery.target_count,
                max_attempts: config.discovery.max_attempts,
                id_space: config.discovery.id_space,
            },
            checkpoint_every: config.discovery.checkpoint_every.max(1),
            markers: config.catalog.not_found_markers.clone(),
            urls: CatalogUrls::from_config(&config.catalog)?,
            client: build_http_client(&config.http)?,
            checkpoint,
            ids: Box::new(RandomIds),
            cancel,
        })
    }

    /// Replaces the identifier source
    pub fn with_id_source(mut self, ids: impl IdSource + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn checkpoint(&self) -> &C {
        &self.checkpoint
    }

    /// Runs discovery with the configured limits
    ///
    /// Unless `fresh` is set, URLs from the existing checkpoint count toward
    /// the target and are kept in every save.
    pub async fn run(&mut self, fresh: bool) -> Result<DiscoveryOutput, HarvestError> {
        let seed = if fresh {
            tracing::info!("Starting fresh discovery, ignoring existing checkpoint");
            BTreeSet::new()
        } else {
            self.load_seed()?
        };
        self.discover(self.limits, seed).await
    }

    /// The probe loop
    ///
    /// Duplicate draws cost an attempt but send no request. The checkpoint is
    /// saved every `checkpoint_every` attempts and once more on exit, including
    /// exit by cancellation.
    ///
    /// A seed larger than `target_count` is saved whole, but only its first
    /// `target_count` URLs (in sorted order) are returned.
    pub async fn discover(
        &mut self,
        limits: DiscoveryLimits,
        seed: BTreeSet<String>,
    ) -> Result<DiscoveryOutput, HarvestError> {
        if limits.id_space == 0 {
            return Err(ConfigError::Validation(
                "discovery id-space must be at least 1".to_string(),
            )
            .into());
        }

        let mut found = seed;
        let mut tried: HashSet<u64> = HashSet::new();
        let mut attempts: u64 = 0;
        let mut report = DiscoveryReport::new(found.len());

        tracing::info!(
            "Starting discovery: target_count={}, max_attempts={}, id_space={}, already found={}",
            limits.target_count,
            limits.max_attempts,
            limits.id_space,
            found.len()
        );

        while found.len() < limits.target_count && attempts < limits.max_attempts {
            if self.cancel.is_cancelled() {
                tracing::warn!("Discovery interrupted after {} attempts", attempts);
                report.interrupted = true;
                break;
            }

            attempts += 1;
            let id = self.ids.next_id(limits.id_space);

            let outcome = if tried.insert(id) {
                let candidate = self.urls.candidate(id);
                tracing::info!(
                    "Probing {} (attempt={}, found={})",
                    candidate,
                    attempts,
                    found.len()
                );
                let result = fetch_url(&self.client, &candidate).await;
                classify_probe(result, &self.urls, &self.markers)
            } else {
                ProbeOutcome::Duplicate
            };

            match &outcome {
                ProbeOutcome::Valid { .. } => {}
                ProbeOutcome::Duplicate => tracing::debug!("Identifier {} already tried", id),
                ProbeOutcome::FetchError { .. } => {
                    tracing::error!("Probe of identifier {} failed: {}", id, outcome)
                }
                _ => tracing::info!("Identifier {} skipped: {}", id, outcome),
            }

            report.record(&outcome);
            if let ProbeOutcome::Valid { final_url } = outcome {
                if found.insert(final_url.clone()) {
                    tracing::info!("Film {} OK, {} found so far", final_url, found.len());
                }
            }

            if attempts % self.checkpoint_every == 0 {
                self.checkpoint.save(&found)?;
            }
        }

        self.checkpoint.save(&found)?;

        // The checkpoint keeps everything; the run reports at most the target
        if found.len() > limits.target_count {
            tracing::warn!(
                "Checkpoint holds {} films, above the target of {}; returning the first {}",
                found.len(),
                limits.target_count,
                limits.target_count
            );
            found = found.into_iter().take(limits.target_count).collect();
        }

        report.attempts = attempts;
        report.found = found.len();
        report.finish();

        tracing::info!(
            "Discovery finished: {} films ({} new), {} attempts, {} requests, {}s",
            report.found,
            report.newly_found(),
            report.attempts,
            report.tried,
            report.duration_seconds().unwrap_or(0)
        );

        Ok(DiscoveryOutput {
            urls: found,
            report,
        })
    }

    /// Loads the checkpoint, dropping anything that is not a detail-page URL
    fn load_seed(&self) -> Result<BTreeSet<String>, HarvestError> {
        let (kept, dropped): (BTreeSet<String>, BTreeSet<String>) = self
            .checkpoint
            .load()?
            .into_iter()
            .partition(|url| self.urls.is_detail_page(url));

        for url in &dropped {
            tracing::warn!("Dropping checkpoint entry {}: not a detail page", url);
        }
        if !kept.is_empty() {
            tracing::info!("Resuming discovery with {} known films", kept.len());
        }
        Ok(kept)
    }
}
