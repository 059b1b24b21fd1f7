//! Document deduplication
//!
//! Documents sharing an `_id` describe the same subject–object pair. With
//! merging enabled, the first observation is kept and every later one
//! contributes only its `relation` record, appended to a list. Each record
//! carries an `observed` map with the object attributes seen in that row,
//! since those may differ between rows sharing an `_id`.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::trace;

const ID_KEY: &str = "_id";
const RELATION_KEY: &str = "relation";
const OBJECT_KEY: &str = "object";
const OBSERVED_KEY: &str = "observed";

/// Object attributes that can vary between observations of one pair
const OBSERVED_FIELDS: [&str; 3] = ["name", "family", "species"];

/// Accumulates filtered documents in first-seen order.
#[derive(Debug, Default)]
pub struct DocumentMerger {
    enabled: bool,
    documents: Vec<Value>,
    index: HashMap<String, usize>,
    merged: usize,
}

impl DocumentMerger {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Add one document. Returns `true` when it was folded into an existing
    /// document rather than stored on its own.
    pub fn push(&mut self, mut doc: Value) -> bool {
        if !self.enabled {
            self.documents.push(doc);
            return false;
        }

        let Some(id) = doc.get(ID_KEY).and_then(Value::as_str).map(str::to_string) else {
            // Nothing to merge on; keep it as-is.
            self.documents.push(doc);
            return false;
        };

        let record = take_observation(&mut doc);

        match self.index.get(&id) {
            Some(&position) => {
                if let Some(list) = self.documents[position]
                    .get_mut(RELATION_KEY)
                    .and_then(Value::as_array_mut)
                {
                    list.extend(record);
                }
                self.merged += 1;
                trace!(id = %id, "Merged repeated document");
                true
            },
            None => {
                // Replaced in place so the key keeps its position.
                if let Some(slot) = doc.get_mut(RELATION_KEY) {
                    *slot = Value::Array(record.into_iter().collect());
                }
                self.index.insert(id, self.documents.len());
                self.documents.push(doc);
                false
            },
        }
    }

    /// Number of documents folded into an earlier one
    pub fn merged(&self) -> usize {
        self.merged
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_documents(self) -> Vec<Value> {
        self.documents
    }
}

/// Take the document's relation record, tagged with the object attributes
/// of this observation. Leaves `null` in the relation slot.
fn take_observation(doc: &mut Value) -> Option<Value> {
    let mut record = doc.get_mut(RELATION_KEY).map(Value::take)?;

    let observed: Map<String, Value> = doc
        .get(OBJECT_KEY)
        .and_then(Value::as_object)
        .map(|object| {
            OBSERVED_FIELDS
                .iter()
                .filter_map(|field| object.get(*field).map(|v| (field.to_string(), v.clone())))
                .collect()
        })
        .unwrap_or_default();

    if !observed.is_empty() {
        if let Some(map) = record.as_object_mut() {
            map.insert(OBSERVED_KEY.to_string(), Value::Object(observed));
        }
    }

    Some(record)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, pubmed: &str) -> Value {
        json!({
            "_id": id,
            "subject": {"id": id.split('-').next().unwrap()},
            "relation": {"pubmed": [pubmed]},
            "object": {"id": "11060"},
            "predicate": "targets",
        })
    }

    #[test]
    fn test_disabled_keeps_every_document() {
        let mut merger = DocumentMerger::new(false);
        assert!(!merger.push(doc("2D22-11060", "1")));
        assert!(!merger.push(doc("2D22-11060", "2")));

        let docs = merger.into_documents();
        assert_eq!(docs.len(), 2);
        assert!(docs[0]["relation"].is_object());
    }

    #[test]
    fn test_repeated_id_appends_relation() {
        let mut merger = DocumentMerger::new(true);
        assert!(!merger.push(doc("2D22-11060", "1")));
        assert!(!merger.push(doc("1A1D-11060", "3")));
        assert!(merger.push(doc("2D22-11060", "2")));
        assert_eq!(merger.merged(), 1);

        let docs = merger.into_documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["_id"], "2D22-11060");
        assert_eq!(
            docs[0]["relation"],
            json!([{"pubmed": ["1"]}, {"pubmed": ["2"]}])
        );
        assert_eq!(docs[1]["relation"], json!([{"pubmed": ["3"]}]));
    }

    #[test]
    fn test_relation_list_keeps_key_position() {
        let mut merger = DocumentMerger::new(true);
        merger.push(doc("2D22-11060", "1"));

        let docs = merger.into_documents();
        let keys: Vec<&str> = docs[0].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["_id", "subject", "relation", "object", "predicate"]);
    }

    #[test]
    fn test_first_observation_wins_for_entities() {
        let mut merger = DocumentMerger::new(true);
        let mut first = doc("2D22-11060", "1");
        first["object"]["name"] = json!("Dengue");
        let mut second = doc("2D22-11060", "2");
        second["object"]["name"] = json!("Dengue virus 2");

        merger.push(first);
        merger.push(second);

        let docs = merger.into_documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["object"]["name"], "Dengue");
    }

    #[test]
    fn test_each_record_keeps_its_object_attributes() {
        let mut merger = DocumentMerger::new(true);
        let mut first = doc("MAB0001-11060", "1");
        first["object"]["name"] = json!("Dengue");
        first["object"]["family"] = json!("Flaviviridae");
        let mut second = doc("MAB0001-11060", "2");
        second["object"]["name"] = json!("Dengue virus 2");

        merger.push(first);
        merger.push(second);

        let docs = merger.into_documents();
        assert_eq!(
            docs[0]["relation"],
            json!([
                {"pubmed": ["1"], "observed": {"name": "Dengue", "family": "Flaviviridae"}},
                {"pubmed": ["2"], "observed": {"name": "Dengue virus 2"}},
            ])
        );
    }

    #[test]
    fn test_merged_document_keeps_key_order() {
        let mut merger = DocumentMerger::new(true);
        merger.push(doc("2D22-11060", "1"));
        merger.push(doc("2D22-11060", "2"));

        let docs = merger.into_documents();
        let keys: Vec<&str> = docs[0].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["_id", "subject", "relation", "object", "predicate"]);
    }
}
