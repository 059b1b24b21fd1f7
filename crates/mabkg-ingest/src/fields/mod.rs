//! Parsers for compound cells
//!
//! Several columns pack more than one value into a single cell. Each parser
//! here accepts the raw (possibly missing) cell and never fails: anything it
//! cannot interpret is dropped.

pub mod epitope;
pub mod targets;
pub mod xref;

pub use epitope::{parse_epitope, Epitope};
pub use targets::{parse_targets, ProteinTarget};
pub use xref::{parse_cross_reference, CrossReferences};

/// Split a citation cell into trimmed PubMed identifiers.
///
/// `"26265529, 18264114"` -> `["26265529", "18264114"]`; a missing or empty
/// cell yields an empty list.
pub fn parse_pubmed_ids(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
