//! Cross-reference cells
//!
//! Observed shapes:
//!
//! ```text
//! PDB: 2R69
//! PDB: 6WEQ, PDB: 7K93
//! PDB: 2I69 and 1SVB
//! PDB: 5JHM, 5JHL
//! Cellosaurus: CVCL_J890, Addgene: 120363
//! ```
//!
//! Tokens are separated by `,` or the word `and`. A token carrying a
//! `Source:` label opens a group; unlabelled tokens that follow continue the
//! most recent group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Identifiers grouped by source registry, e.g. `{"PDB": ["2I69", "1SVB"]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrossReferences(BTreeMap<String, Vec<String>>);

impl CrossReferences {
    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.0.get(source).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct sources
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn push(&mut self, source: &str, id: &str) {
        if id.is_empty() {
            return;
        }
        self.0
            .entry(source.to_string())
            .or_default()
            .push(id.to_string());
    }
}

/// Parse a cross-reference cell. Missing or empty input yields an empty map.
///
/// Source labels are compared exactly after trimming; `pdb` and `PDB` are
/// different sources.
pub fn parse_cross_reference(raw: Option<&str>) -> CrossReferences {
    let mut refs = CrossReferences::default();

    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return refs;
    };

    // Label of the most recent labelled token; carried across the scan.
    let mut sticky: Option<&str> = None;

    for token in split_tokens(raw) {
        match token.split_once(':') {
            Some((label, id)) => {
                let label = label.trim();
                if label.is_empty() {
                    sticky = None;
                    trace!(token, "Dropping cross-reference with empty source label");
                    continue;
                }
                sticky = Some(label);
                refs.push(label, id.trim());
            },
            None => match sticky {
                Some(label) => refs.push(label, token.trim()),
                None if token.trim().is_empty() => {},
                None => trace!(token, "Dropping unlabelled cross-reference"),
            },
        }
    }

    refs
}

/// Split on `,` and on `and` when it is not part of a longer word.
fn split_tokens(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b',' {
            tokens.push(&raw[start..i]);
            i += 1;
            start = i;
        } else if is_and_separator(bytes, i) {
            tokens.push(&raw[start..i]);
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    tokens.push(&raw[start..]);

    tokens
}

fn is_and_separator(bytes: &[u8], i: usize) -> bool {
    bytes[i..].starts_with(b"and")
        && (i == 0 || !bytes[i - 1].is_ascii_alphabetic())
        && bytes.get(i + 3).map_or(true, |b| !b.is_ascii_alphabetic())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(refs: &CrossReferences, source: &str) -> Vec<String> {
        refs.get(source).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn test_single_reference() {
        let refs = parse_cross_reference(Some("PDB: 2R69"));
        assert_eq!(refs.len(), 1);
        assert_eq!(ids(&refs, "PDB"), vec!["2R69"]);
    }

    #[test]
    fn test_repeated_labels_accumulate() {
        let refs = parse_cross_reference(Some("PDB: 6WEQ, PDB: 7K93"));
        assert_eq!(ids(&refs, "PDB"), vec!["6WEQ", "7K93"]);
    }

    #[test]
    fn test_and_continuation_inherits_label() {
        let refs = parse_cross_reference(Some("PDB: 2I69 and 1SVB"));
        assert_eq!(ids(&refs, "PDB"), vec!["2I69", "1SVB"]);
    }

    #[test]
    fn test_comma_continuation_inherits_label() {
        let refs = parse_cross_reference(Some("PDB: 5JHM, 5JHL"));
        assert_eq!(ids(&refs, "PDB"), vec!["5JHM", "5JHL"]);
    }

    #[test]
    fn test_mixed_sources() {
        let refs = parse_cross_reference(Some(
            "Cellosaurus: CVCL_J890, Addgene: 120363 and 120364, PDB: 2R69",
        ));
        assert_eq!(refs.len(), 3);
        assert_eq!(ids(&refs, "Cellosaurus"), vec!["CVCL_J890"]);
        assert_eq!(ids(&refs, "Addgene"), vec!["120363", "120364"]);
        assert_eq!(ids(&refs, "PDB"), vec!["2R69"]);
    }

    #[test]
    fn test_and_without_spaces_is_a_separator() {
        let refs = parse_cross_reference(Some("PDB: 2I69and1SVB"));
        assert_eq!(ids(&refs, "PDB"), vec!["2I69", "1SVB"]);
    }

    #[test]
    fn test_and_inside_word_is_not_a_separator() {
        let refs = parse_cross_reference(Some("Candida: CA1, Landsteiner: L7"));
        assert_eq!(ids(&refs, "Candida"), vec!["CA1"]);
        assert_eq!(ids(&refs, "Landsteiner"), vec!["L7"]);
    }

    #[test]
    fn test_leading_unlabelled_token_is_dropped() {
        let refs = parse_cross_reference(Some("2R69, PDB: 6WEQ"));
        assert_eq!(refs.len(), 1);
        assert_eq!(ids(&refs, "PDB"), vec!["6WEQ"]);
    }

    #[test]
    fn test_value_split_on_first_colon_only() {
        let refs = parse_cross_reference(Some("Addgene: plasmid:120363"));
        assert_eq!(ids(&refs, "Addgene"), vec!["plasmid:120363"]);
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let refs = parse_cross_reference(Some("PDB: 2R69, pdb: 6WEQ"));
        assert_eq!(refs.len(), 2);
        assert_eq!(ids(&refs, "pdb"), vec!["6WEQ"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_cross_reference(None).is_empty());
        assert!(parse_cross_reference(Some("")).is_empty());
        assert!(parse_cross_reference(Some("   ")).is_empty());
        assert!(parse_cross_reference(Some(" , and ,")).is_empty());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let refs = parse_cross_reference(Some("PDB: 2I69 and 1SVB"));
        let json = serde_json::to_value(&refs).unwrap();
        assert_eq!(json, serde_json::json!({"PDB": ["2I69", "1SVB"]}));
    }

    proptest! {
        #[test]
        fn prop_grouped_input_round_trips(
            groups in prop::collection::vec(
                ("[A-Z][a-z]{1,8}", prop::collection::vec("[0-9A-Z]{4}", 1..4)),
                1..5,
            )
        ) {
            let raw = groups
                .iter()
                .map(|(label, values)| format!("{}: {}", label, values.join(" and ")))
                .collect::<Vec<_>>()
                .join(", ");

            let mut expected: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for (label, values) in &groups {
                expected.entry(label.clone()).or_default().extend(values.iter().cloned());
            }

            let refs = parse_cross_reference(Some(&raw));
            prop_assert_eq!(refs, CrossReferences(expected));
        }
    }
}
