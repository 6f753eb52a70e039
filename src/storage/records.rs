//! Append-only record file and the extraction cursor
//!
//! The cursor is the number of data rows in the record file. It is counted once
//! when the file is opened and then advanced in memory after every durable
//! append, so the two cannot drift apart within a run. Counting is linear in
//! the file size, which is fine for tens of thousands of films but would want
//! a persisted index for much larger harvests.

use crate::fields::{StructuredRecord, RECORD_HEADER};
use crate::storage::traits::RecordSink;
use crate::{StoreError, StoreResult};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const TAIL_BLOCK: usize = 4096;

/// Count of input-list entries whose record is already durable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ExtractionCursor {
    done: u64,
}

impl ExtractionCursor {
    pub fn new(done: u64) -> Self {
        Self { done }
    }

    /// Index of the next input entry to process
    pub fn position(&self) -> u64 {
        self.done
    }

    fn advance(&mut self) {
        self.done += 1;
    }
}

/// Record sink backed by a CSV file with the fixed record header
pub struct CsvRecordSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    cursor: ExtractionCursor,
}

impl CsvRecordSink {
    /// Opens (or creates) the record file and positions the cursor after the
    /// last complete record
    ///
    /// A trailing line without a newline is what a crash in the middle of an
    /// append leaves behind; it is cut off before counting.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let existing_len = match std::fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        let kept_len = if existing_len > 0 {
            repair_torn_tail(&path)?
        } else {
            0
        };

        let done = if kept_len > 0 {
            count_records(&path)?
        } else {
            0
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(RECORD_HEADER)?;
            writer.flush()?;
            writer.get_ref().sync_data()?;
        }

        if done > 0 {
            tracing::info!("{} already holds {} records", path.display(), done);
        }

        Ok(Self {
            path,
            writer,
            cursor: ExtractionCursor::new(done),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvRecordSink {
    fn cursor(&self) -> ExtractionCursor {
        self.cursor
    }

    fn append(&mut self, record: &StructuredRecord) -> StoreResult<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.cursor.advance();
        Ok(())
    }
}

/// Truncates the file after its last newline and returns the kept length
///
/// Only the tail is read, one block at a time from the end.
fn repair_torn_tail(path: &Path) -> StoreResult<u64> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let len = file.metadata()?.len();

    let mut block = [0u8; TAIL_BLOCK];
    let mut end = len;
    let mut keep = 0;
    while end > 0 {
        let start = end.saturating_sub(TAIL_BLOCK as u64);
        let size = (end - start) as usize;
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut block[..size])?;

        if end == len && block[size - 1] == b'\n' {
            return Ok(len);
        }
        if let Some(i) = block[..size].iter().rposition(|b| *b == b'\n') {
            keep = start + i as u64 + 1;
            break;
        }
        end = start;
    }

    tracing::warn!(
        "Dropping {} bytes of incomplete trailing record from {}",
        len - keep,
        path.display()
    );

    file.set_len(keep)?;
    file.sync_data()?;
    Ok(keep)
}

/// Counts data rows after validating the header
fn count_records(path: &Path) -> StoreResult<u64> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?;
    if !headers.iter().eq(RECORD_HEADER.iter().copied()) {
        return Err(StoreError::Corrupt {
            path: path.display().to_string(),
            message: format!(
                "expected header '{}', found '{}'",
                RECORD_HEADER.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        });
    }

    let mut count = 0;
    for row in reader.records() {
        row?;
        count += 1;
    }
    Ok(count)
}
