//! End-to-end conversion
//!
//! read → validate → synthesize → filter → merge, then optionally enrich.
//! Rows are processed strictly in order; each row's documents are fully
//! drained before the next row is read.

use crate::config::IngestConfig;
use crate::dedup::DocumentMerger;
use crate::document::{DocumentSynthesizer, RelationDocument};
use crate::enrich::{enrich_documents, DiseaseLookup, DiseaseNameCache, EnrichStats};
use crate::filter::{default_forbidden, filter_document};
use crate::reader::TableReader;
use crate::validate::RowValidator;
use mabkg_common::Result;
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub rows_read: usize,
    pub empty_rows: usize,
    pub malformed_rows: usize,
    pub invalid_rows: usize,
    pub valid_rows: usize,
    /// Documents suppressed by the pending-curation rule
    pub excluded_documents: usize,
    pub documents_synthesized: usize,
    pub documents_merged: usize,
    pub documents_emitted: usize,
}

/// Result of [`Pipeline::run_reader`]
#[derive(Debug)]
pub struct PipelineOutput {
    pub documents: Vec<Value>,
    pub stats: PipelineStats,
}

/// Batch output wrapper, `{"data": [...]}`
#[derive(Serialize)]
struct Batch<'a> {
    data: &'a [Value],
}

pub struct Pipeline {
    config: IngestConfig,
    validator: RowValidator,
    synthesizer: DocumentSynthesizer,
    forbidden: Vec<Value>,
}

impl Pipeline {
    /// Build a pipeline; the configuration is validated first.
    pub fn new(config: IngestConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            validator: RowValidator::new(&config.columns),
            synthesizer: DocumentSynthesizer::new(&config),
            forbidden: default_forbidden(),
            config,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Open the table at `path` with the configured delimiter
    pub fn open(&self, path: impl AsRef<Path>) -> Result<TableReader<std::fs::File>> {
        TableReader::from_path(path, self.config.delimiter_byte()?)
    }

    /// Lazy stream of filtered, unmerged documents
    pub fn documents<R: Read>(&self, reader: TableReader<R>) -> DocumentStream<'_, R> {
        DocumentStream {
            pipeline: self,
            reader,
            pending: Vec::new().into_iter(),
            stats: PipelineStats::default(),
        }
    }

    /// Convert every row and merge the results
    pub fn run_reader<R: Read>(&self, reader: TableReader<R>) -> Result<PipelineOutput> {
        let mut merger = DocumentMerger::new(self.config.dedup.enabled);
        let mut stream = self.documents(reader);

        for doc in stream.by_ref() {
            merger.push(doc?);
        }

        let mut stats = stream.stats();
        stats.documents_merged = merger.merged();
        stats.documents_emitted = merger.len();

        info!(
            rows_read = stats.rows_read,
            valid_rows = stats.valid_rows,
            invalid_rows = stats.invalid_rows,
            malformed_rows = stats.malformed_rows,
            excluded_documents = stats.excluded_documents,
            documents_merged = stats.documents_merged,
            documents_emitted = stats.documents_emitted,
            "Conversion complete"
        );

        Ok(PipelineOutput {
            documents: merger.into_documents(),
            stats,
        })
    }

    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<PipelineOutput> {
        let path = path.as_ref();
        info!(path = %path.display(), "Converting table");
        self.run_reader(self.open(path)?)
    }

    /// Read and validate only; no documents are built.
    pub fn check_reader<R: Read>(&self, mut reader: TableReader<R>) -> Result<PipelineStats> {
        let mut stats = PipelineStats::default();

        for row in reader.by_ref() {
            match self.validator.validate(row?) {
                Ok(_) => stats.valid_rows += 1,
                Err(_) => stats.invalid_rows += 1,
            }
        }

        let read = reader.stats();
        stats.rows_read = read.records_read;
        stats.empty_rows = read.empty_skipped;
        stats.malformed_rows = read.malformed_skipped;

        info!(
            rows_read = stats.rows_read,
            valid_rows = stats.valid_rows,
            invalid_rows = stats.invalid_rows,
            malformed_rows = stats.malformed_rows,
            "Check complete"
        );

        Ok(stats)
    }

    pub fn check_path(&self, path: impl AsRef<Path>) -> Result<PipelineStats> {
        self.check_reader(self.open(path)?)
    }

    /// Fill disease names in place with a cache scoped to this call
    pub async fn enrich(
        &self,
        output: &mut PipelineOutput,
        lookup: &dyn DiseaseLookup,
    ) -> EnrichStats {
        let mut cache = DiseaseNameCache::new();
        enrich_documents(
            &mut output.documents,
            lookup,
            &mut cache,
            self.config.enrichment.retry_failed,
        )
        .await
    }
}

/// Documents for every row of a table, in row order.
///
/// Single pass; dropped rows are counted in [`DocumentStream::stats`].
pub struct DocumentStream<'a, R: Read> {
    pipeline: &'a Pipeline,
    reader: TableReader<R>,
    pending: std::vec::IntoIter<RelationDocument>,
    stats: PipelineStats,
}

impl<R: Read> DocumentStream<'_, R> {
    pub fn stats(&self) -> PipelineStats {
        let read = self.reader.stats();
        PipelineStats {
            rows_read: read.records_read,
            empty_rows: read.empty_skipped,
            malformed_rows: read.malformed_skipped,
            ..self.stats
        }
    }
}

impl<R: Read> Iterator for DocumentStream<'_, R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(doc) = self.pending.next() {
                self.stats.documents_synthesized += 1;
                let json = doc
                    .to_json()
                    .map(|json| filter_document(json, &self.pipeline.forbidden))
                    .map_err(Into::into);
                return Some(json);
            }

            let row = match self.reader.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };

            match self.pipeline.validator.validate(row) {
                Ok(valid) => {
                    self.stats.valid_rows += 1;
                    let out = self.pipeline.synthesizer.synthesize(&valid);
                    self.stats.excluded_documents += out.excluded;
                    self.pending = out.into_iter();
                },
                Err(e) => {
                    self.stats.invalid_rows += 1;
                    debug!(error = %e, "Skipping invalid row");
                },
            }
        }
    }
}

/// Write documents as indented `{"data": [...]}` JSON
pub fn write_output<W: Write>(mut writer: W, documents: &[Value]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &Batch { data: documents })?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
