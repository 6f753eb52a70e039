use crate::state::ProbeOutcome;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Counters for one discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    /// Loop iterations consumed (each costs one unit of the attempt budget)
    pub attempts: u64,

    /// Distinct identifiers probed this run
    pub tried: u64,

    /// Valid URLs already present in the checkpoint when the run started
    pub resumed_with: usize,

    /// Valid URLs held when the run ended
    pub found: usize,

    /// Outcome label -> count
    pub outcomes: BTreeMap<&'static str, u64>,

    /// The run stopped on an external signal
    pub interrupted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DiscoveryReport {
    pub fn new(resumed_with: usize) -> Self {
        Self {
            attempts: 0,
            tried: 0,
            resumed_with,
            found: resumed_with,
            outcomes: BTreeMap::new(),
            interrupted: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Records one classified probe
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        *self.outcomes.entry(outcome.label()).or_insert(0) += 1;
        if outcome.was_fetched() {
            self.tried += 1;
        }
    }

    /// Number of probes that ended with the given label
    pub fn count(&self, label: &str) -> u64 {
        self.outcomes.get(label).copied().unwrap_or(0)
    }

    /// URLs added by this run
    pub fn newly_found(&self) -> usize {
        self.found.saturating_sub(self.resumed_with)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Counters for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Records that were already durable when the run started
    pub resumed_at: u64,

    /// Records appended by this run
    pub written: u64,

    /// Appended records that fell back entirely to sentinels because the page
    /// could not be fetched
    pub fetch_failures: u64,

    /// Length of the input list
    pub input_len: u64,

    /// The run stopped on an external signal
    pub interrupted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExtractionReport {
    pub fn new(resumed_at: u64, input_len: u64) -> Self {
        Self {
            resumed_at,
            written: 0,
            fetch_failures: 0,
            input_len,
            interrupted: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Total durable records after this run
    pub fn total(&self) -> u64 {
        self.resumed_at + self.written
    }

    /// Input entries still waiting for a record
    pub fn remaining(&self) -> u64 {
        self.input_len.saturating_sub(self.total())
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}
