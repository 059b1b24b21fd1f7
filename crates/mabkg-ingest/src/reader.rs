//! Delimited table reader
//!
//! Turns a comma- or tab-separated source into a lazy sequence of [`Row`]s.
//! The first record is the header. Records whose cell count differs from
//! the header are skipped with a diagnostic; all-empty records are skipped
//! silently. Values stay strings; typing is the validator's job.

use crate::error::RowError;
use mabkg_common::{MabkgError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

const BOM: char = '\u{feff}';

/// One data record keyed by the header's field names.
///
/// Every row produced by one reader shares the same header, so the key set
/// is identical across rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: usize,
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Build a row directly. Headers past the end of `values` read as missing.
    pub fn new(index: usize, headers: Arc<[String]>, values: Vec<String>) -> Self {
        Self {
            index,
            headers,
            values,
        }
    }

    /// Zero-based position among the data records (header excluded)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell value for a field, or `None` when the column or its value is missing
    pub fn get(&self, field: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == field)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Cell value for a field, treating an empty cell like a missing column
    pub fn non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Trim leading/trailing whitespace from every cell in place
    pub fn trim_values(&mut self) {
        for value in &mut self.values {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }

    /// Header-ordered JSON rendering, used in diagnostics
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .headers
            .iter()
            .zip(&self.values)
            .map(|(h, v)| (h.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

/// Counters for records the reader dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub records_read: usize,
    pub empty_skipped: usize,
    pub malformed_skipped: usize,
}

/// Lazy, single-pass reader over a delimited table
pub struct TableReader<R: Read> {
    inner: csv::Reader<R>,
    headers: Arc<[String]>,
    record: csv::StringRecord,
    next_index: usize,
    stats: ReaderStats,
}

impl TableReader<File> {
    /// Open a table on disk. Failure to open or to read the header is fatal.
    pub fn from_path(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "Opened source table");
        Self::from_reader(file, delimiter)
    }
}

impl<R: Read> TableReader<R> {
    pub fn from_reader(source: R, delimiter: u8) -> Result<Self> {
        let mut inner = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers: Vec<String> = inner
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches(BOM).to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(MabkgError::parse("Source table has no header row"));
        }

        debug!(fields = headers.len(), "Read header row");

        Ok(Self {
            inner,
            headers: headers.into(),
            record: csv::StringRecord::new(),
            next_index: 0,
            stats: ReaderStats::default(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }
}

impl<R: Read> Iterator for TableReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let index = self.next_index;

            match self.inner.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {},
                Err(e) if e.is_io_error() => return Some(Err(e.into())),
                Err(e) => {
                    // Undecodable text and similar record-level problems
                    self.next_index += 1;
                    self.stats.records_read += 1;
                    self.stats.malformed_skipped += 1;
                    let err = RowError::MalformedRow {
                        index,
                        reason: e.to_string(),
                    };
                    debug!(error = %err, "Skipping malformed row");
                    continue;
                },
            }

            self.next_index += 1;
            self.stats.records_read += 1;

            if self.record.iter().all(|cell| cell.trim().is_empty()) {
                self.stats.empty_skipped += 1;
                trace!(index, "Skipping empty row");
                continue;
            }

            if self.record.len() != self.headers.len() {
                self.stats.malformed_skipped += 1;
                let err = RowError::MalformedRow {
                    index,
                    reason: format!(
                        "expected {} fields, found {}",
                        self.headers.len(),
                        self.record.len()
                    ),
                };
                debug!(error = %err, row = ?self.record, "Skipping row due to row length mismatch");
                continue;
            }

            let values = self.record.iter().map(str::to_string).collect();
            return Some(Ok(Row::new(index, Arc::clone(&self.headers), values)));
        }
    }
}
