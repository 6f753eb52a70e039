//! Storage module for persisting harvest progress
//!
//! This module owns the two durable artifacts of a harvest:
//! - the discovered-URL checkpoint, rewritten atomically in full on every save
//! - the record file, appended and flushed one record at a time
//!
//! Both are single-header CSV files so they can be inspected and edited by hand.

mod checkpoint;
mod records;
mod traits;

pub use checkpoint::{read_url_list, CsvUrlCheckpoint};
pub use records::{CsvRecordSink, ExtractionCursor};
pub use traits::{RecordSink, UrlCheckpoint};

/// Header of the URL list / checkpoint file
pub const URL_HEADER: &str = "url";
