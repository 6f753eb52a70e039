//! Statistics generation from harvest files
//!
//! Both files are read as they are on disk; neither is modified.

use crate::config::Config;
use crate::fields::{StructuredRecord, RECORD_HEADER, SENTINEL};
use crate::storage::read_url_list;
use crate::HarvestError;
use std::collections::BTreeMap;
use std::path::Path;

/// Harvest statistics summary
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// Entries in the discovery checkpoint
    pub discovered_urls: usize,

    /// Entries in the extraction input list
    pub input_urls: usize,

    /// Data rows in the record file
    pub records: u64,

    /// Column name -> number of records where that field is unknown
    pub unknown_by_column: BTreeMap<&'static str, u64>,

    /// Records with every field unknown
    pub fully_unknown: u64,
}

impl HarvestStatistics {
    /// Fraction of input entries that already have a record
    pub fn progress(&self) -> f64 {
        if self.input_urls == 0 {
            0.0
        } else {
            self.records as f64 / self.input_urls as f64 * 100.0
        }
    }
}

/// Loads statistics from the configured files
///
/// Missing files count as empty.
pub fn load_statistics(config: &Config) -> Result<HarvestStatistics, HarvestError> {
    let mut stats = HarvestStatistics {
        discovered_urls: count_urls(Path::new(&config.discovery.output_path))?,
        input_urls: count_urls(Path::new(&config.extraction.input_path))?,
        ..HarvestStatistics::default()
    };

    let records_path = Path::new(&config.extraction.output_path);
    if !records_path.exists() {
        return Ok(stats);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(records_path)
        .map_err(crate::StoreError::from)?;

    for record in reader.deserialize::<StructuredRecord>() {
        // an incomplete final row is repaired on the next extraction run
        let Ok(record) = record else { continue };

        stats.records += 1;
        let mut unknown = 0;
        for (column, value) in RECORD_HEADER.iter().zip(record.values()) {
            if value == SENTINEL {
                *stats.unknown_by_column.entry(*column).or_insert(0) += 1;
                unknown += 1;
            }
        }
        if unknown == RECORD_HEADER.len() {
            stats.fully_unknown += 1;
        }
    }

    Ok(stats)
}

fn count_urls(path: &Path) -> Result<usize, HarvestError> {
    if !path.exists() {
        return Ok(0);
    }
    Ok(read_url_list(path)?.len())
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Discovered URLs: {}", stats.discovered_urls);
    println!("  Input URLs: {}", stats.input_urls);
    println!(
        "  Records written: {} ({:.1}% of input)",
        stats.records,
        stats.progress()
    );
    println!("  Records without any field: {}", stats.fully_unknown);
    println!();

    if stats.records > 0 {
        println!("Unknown Fields:");
        for column in RECORD_HEADER {
            let count = stats.unknown_by_column.get(column).copied().unwrap_or(0);
            let percentage = count as f64 / stats.records as f64 * 100.0;
            println!("  {}: {} ({:.1}%)", column, count, percentage);
        }
    }
}
