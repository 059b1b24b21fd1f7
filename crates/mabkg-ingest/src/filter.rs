//! Document filter
//!
//! Recursively strips forbidden values from a JSON document. Children are
//! filtered before their parent inspects them, so a mapping that only
//! becomes `{}` through filtering is itself removed one level up.

use serde_json::{Map, Value};

/// The forbidden set used by the pipeline: `""`, `null` and `{}`.
///
/// Empty lists are deliberately absent; `"pubmed": []` survives.
pub fn default_forbidden() -> Vec<Value> {
    vec![
        Value::String(String::new()),
        Value::Null,
        Value::Object(Map::new()),
    ]
}

/// Filter a document against `forbidden`.
///
/// Map entries whose (filtered) value or key is forbidden are dropped; list
/// elements equal to a forbidden value are dropped. Numbers, booleans and
/// non-forbidden strings pass through untouched. A forbidden root is
/// returned as-is.
pub fn filter_document(doc: Value, forbidden: &[Value]) -> Value {
    match doc {
        Value::Object(map) => Value::Object(filter_map(map, forbidden)),
        Value::Array(items) => Value::Array(filter_list(items, forbidden)),
        leaf => leaf,
    }
}

fn filter_map(map: Map<String, Value>, forbidden: &[Value]) -> Map<String, Value> {
    map.into_iter()
        .filter(|(key, _)| !is_forbidden_key(key, forbidden))
        .filter_map(|(key, value)| {
            let value = filter_document(value, forbidden);
            (!forbidden.contains(&value)).then_some((key, value))
        })
        .collect()
}

fn filter_list(items: Vec<Value>, forbidden: &[Value]) -> Vec<Value> {
    items
        .into_iter()
        .map(|item| filter_document(item, forbidden))
        .filter(|item| !forbidden.contains(item))
        .collect()
}

fn is_forbidden_key(key: &str, forbidden: &[Value]) -> bool {
    forbidden
        .iter()
        .any(|f| matches!(f, Value::String(s) if s == key))
}
