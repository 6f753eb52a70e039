//! Resumable detail extraction
//!
//! Walks the discovered URL list in file order, skipping the entries that
//! already have a record, and appends exactly one record per entry. A page
//! that cannot be fetched still gets an all-`NaN` record so the run always
//! moves forward and the record count stays equal to the number of consumed
//! input entries.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::fields::vocabulary::Vocabulary;
use crate::fields::{FieldExtractor, StructuredRecord};
use crate::state::ExtractionReport;
use crate::storage::{read_url_list, CsvRecordSink, RecordSink};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Reads the ordered input list, failing if it is missing or has no entries
pub fn load_input(path: &Path) -> Result<Vec<String>, HarvestError> {
    if !path.exists() {
        return Err(HarvestError::MissingInput {
            path: path.display().to_string(),
        });
    }

    let urls = read_url_list(path)?;
    if urls.is_empty() {
        return Err(HarvestError::EmptyInput {
            path: path.display().to_string(),
        });
    }
    Ok(urls)
}

/// Extraction engine
pub struct Extraction<S: RecordSink> {
    input: Vec<String>,
    sink: S,
    delay: Duration,
    client: Client,
    extractor: FieldExtractor,
    cancel: CancellationToken,
}

impl Extraction<CsvRecordSink> {
    /// Loads the configured input list and opens the configured record file
    ///
    /// The input is checked first, so a missing or empty list fails before the
    /// record file is touched.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self, HarvestError> {
        let input = load_input(Path::new(&config.extraction.input_path))?;
        let sink = CsvRecordSink::open(&config.extraction.output_path)?;
        Self::new(config, input, sink, cancel)
    }
}

impl<S: RecordSink> Extraction<S> {
    pub fn new(
        config: &Config,
        input: Vec<String>,
        sink: S,
        cancel: CancellationToken,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            input,
            sink,
            delay: config.extraction.delay(),
            client: build_http_client(&config.http)?,
            extractor: FieldExtractor::new(Vocabulary::from_config(&config.vocabulary)),
            cancel,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Processes every input entry that has no record yet
    pub async fn run(&mut self) -> Result<ExtractionReport, HarvestError> {
        let input_len = self.input.len() as u64;
        let done = self.sink.cursor().position();

        if done > input_len {
            return Err(HarvestError::ResumeMismatch { done, input_len });
        }

        let mut report = ExtractionReport::new(done, input_len);
        tracing::info!(
            "Starting extraction: {} of {} records already written",
            done,
            input_len
        );

        for index in done..input_len {
            if self.cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }

            if index > done && !self.pause().await {
                report.interrupted = true;
                break;
            }

            let url = self.input[index as usize].clone();
            let record = self.process(&url, &mut report).await;

            self.sink.append(&record)?;
            report.written += 1;

            tracing::info!("[{}] {} => {:?}", index + 1, url, record.values());
        }

        report.finish();

        if report.interrupted {
            tracing::warn!(
                "Extraction interrupted: {} records written, {} remaining",
                report.total(),
                report.remaining()
            );
        } else {
            tracing::info!(
                "Extraction finished: {} records total ({} this run, {} without page), {}s",
                report.total(),
                report.written,
                report.fetch_failures,
                report.duration_seconds().unwrap_or(0)
            );
        }

        Ok(report)
    }

    /// Fetches one page and extracts its record
    async fn process(&self, url: &str, report: &mut ExtractionReport) -> StructuredRecord {
        if url.is_empty() {
            tracing::warn!("Blank input entry, writing an empty record");
            return StructuredRecord::unknown();
        }

        let result = fetch_url(&self.client, url).await;
        if let Some(body) = result.ok_body() {
            return self.extractor.extract(body);
        }

        match result {
            FetchResult::Response { status_code, .. } => {
                tracing::error!("HTTP {} for {}", status_code, url);
            }
            FetchResult::NetworkError { error } => {
                tracing::error!("Failed to fetch {}: {}", url, error);
            }
        }
        report.fetch_failures += 1;
        StructuredRecord::unknown()
    }

    /// Waits out the politeness delay; returns false if cancelled meanwhile
    async fn pause(&self) -> bool {
        if self.delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => true,
            _ = self.cancel.cancelled() => false,
        }
    }
}
