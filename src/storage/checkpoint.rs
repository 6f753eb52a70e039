//! Discovered-URL checkpoint file
//!
//! The checkpoint is written to a temporary file next to the target, synced,
//! and renamed over the target, so readers only ever see a complete snapshot.

use crate::storage::traits::UrlCheckpoint;
use crate::storage::URL_HEADER;
use crate::{StoreError, StoreResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// URL-set checkpoint backed by a single-column CSV file
#[derive(Debug, Clone)]
pub struct CsvUrlCheckpoint {
    path: PathBuf,
}

impl CsvUrlCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl UrlCheckpoint for CsvUrlCheckpoint {
    fn load(&self) -> StoreResult<BTreeSet<String>> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        Ok(read_url_list(&self.path)?
            .into_iter()
            .filter(|url| !url.is_empty())
            .collect())
    }

    fn save(&mut self, urls: &BTreeSet<String>) -> StoreResult<()> {
        let mut temp = NamedTempFile::new_in(self.directory())?;
        {
            let mut writer = csv::Writer::from_writer(temp.as_file_mut());
            writer.write_record([URL_HEADER])?;
            for url in urls {
                writer.write_record([url])?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path)?;

        tracing::info!("Saved {} URLs to {}", urls.len(), self.path.display());
        Ok(())
    }
}

/// Reads an ordered URL list with a `url` header
///
/// Rows are returned in file order, including rows that are blank after
/// trimming (as empty strings), so positions in the list stay stable.
/// Completely empty lines are not rows.
pub fn read_url_list(path: &Path) -> StoreResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header = reader.headers()?.get(0).map(|h| h.trim().to_string());
    match header.as_deref() {
        Some(URL_HEADER) => {}
        // A file with no rows at all has no header either
        None | Some("") => return Ok(Vec::new()),
        Some(other) => {
            return Err(StoreError::Corrupt {
                path: path.display().to_string(),
                message: format!("expected header '{}', found '{}'", URL_HEADER, other),
            })
        }
    }

    let mut urls = Vec::new();
    for row in reader.records() {
        let row = row?;
        urls.push(row.get(0).unwrap_or("").trim().to_string());
    }
    Ok(urls)
}
