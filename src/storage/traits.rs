//! Storage traits
//!
//! The engines are written against these traits so the file formats can be
//! swapped or wrapped in tests.

use crate::fields::StructuredRecord;
use crate::storage::ExtractionCursor;
use crate::StoreResult;
use std::collections::BTreeSet;

/// Durable snapshot of the discovered URL set
pub trait UrlCheckpoint {
    /// Reads the last saved snapshot; a missing snapshot is an empty set
    fn load(&self) -> StoreResult<BTreeSet<String>>;

    /// Replaces the snapshot with `urls`
    ///
    /// Implementations must never leave a partially written snapshot behind,
    /// even if the process dies mid-save.
    fn save(&mut self, urls: &BTreeSet<String>) -> StoreResult<()>;
}

/// Append-only destination for extracted records
pub trait RecordSink {
    /// Number of records already durable; the resume position in the input list
    fn cursor(&self) -> ExtractionCursor;

    /// Appends one record and makes it durable before returning
    ///
    /// The cursor advances by exactly one on success and is untouched on error.
    fn append(&mut self, record: &StructuredRecord) -> StoreResult<()>;
}
