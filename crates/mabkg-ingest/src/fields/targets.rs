//! Target list cells
//!
//! A comma-separated list of target entries, only some of which name a
//! UniProt entry:
//!
//! ```text
//! Envelope protein E (UniProt: P17763 POLG_DEN1W), Non-structural protein 1
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Substring that marks a target entry as a UniProt reference
pub const UNIPROT_MARKER: &str = "UniProt";

/// Namespace prefix for emitted protein identifiers
pub const UNIPROT_NAMESPACE: &str = "UniProtKB";

/// Stripped from the end of an accession, e.g. `P17763)` -> `P17763`
const CLOSING_PUNCTUATION: &[char] = &[')', ']', ';', '.'];

/// A protein target recognised in the target list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProteinTarget {
    /// Namespace-qualified identifier, e.g. `UniProtKB:P17763`
    pub id: String,

    /// The entry the identifier was taken from, trimmed
    pub raw: String,
}

/// Extract UniProt targets, in input order. Entries without the marker
/// are ignored, as are marked entries with no accession after the colon.
pub fn parse_targets(raw: Option<&str>) -> Vec<ProteinTarget> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(',')
        .filter(|entry| entry.contains(UNIPROT_MARKER))
        .filter_map(|entry| {
            let accession = entry
                .split_once(':')
                .and_then(|(_, rest)| rest.split_whitespace().next())
                .map(|token| token.trim_end_matches(CLOSING_PUNCTUATION))
                .filter(|accession| !accession.is_empty());

            match accession {
                Some(accession) => Some(ProteinTarget {
                    id: format!("{}:{}", UNIPROT_NAMESPACE, accession),
                    raw: entry.trim().to_string(),
                }),
                None => {
                    trace!(entry, "UniProt target without accession");
                    None
                },
            }
        })
        .collect()
}
