//! MABKG Ingest Library
//!
//! Converts a curated antibody table into knowledge-graph relation
//! documents.
//!
//! # Relation families
//!
//! - **antibody-protein**: antibody `targets` a UniProt protein
//! - **protein-virus**: protein belongs to a virus
//! - **virus-disease**: virus `causes` a disease
//! - **antibody-virus**: antibody `targets` a virus
//! - **antibody-disease** (opt-in): antibody `treats` a disease
//!
//! # Example
//!
//! ```no_run
//! use mabkg_ingest::config::IngestConfig;
//! use mabkg_ingest::pipeline::{write_output, Pipeline};
//!
//! fn main() -> mabkg_common::Result<()> {
//!     let pipeline = Pipeline::new(IngestConfig::default())?;
//!     let output = pipeline.run_path("./data/mabs.tsv")?;
//!     write_output(std::io::stdout().lock(), &output.documents)?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod dedup;
pub mod document;
pub mod enrich;
pub mod error;
pub mod fields;
pub mod filter;
pub mod pipeline;
pub mod reader;
pub mod validate;

pub use config::IngestConfig;
pub use error::RowError;
pub use pipeline::{Pipeline, PipelineOutput, PipelineStats};
