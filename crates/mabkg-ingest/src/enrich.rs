//! Disease name enrichment
//!
//! An optional post-pass over emitted documents: every document whose object
//! is a disease gets its `object.name` filled from an external disease
//! metadata service. Lookups go through a [`DiseaseNameCache`] owned by the
//! run, so a label is queried at most once.

use crate::config::EnrichmentConfig;
use async_trait::async_trait;
use mabkg_common::{MabkgError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Disease lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Disease lookup returned status {0}")]
    Status(u16),

    #[error("Disease lookup response could not be decoded: {0}")]
    Decode(String),
}

impl EnrichError {
    /// Transport-level failure, as opposed to a definitive answer from the
    /// service
    pub fn is_transient(&self) -> bool {
        matches!(self, EnrichError::Http(_))
    }
}

/// Resolves a disease label to a canonical name
#[async_trait]
pub trait DiseaseLookup: Send + Sync {
    /// `Ok(None)` when the service has no entry for the label
    async fn lookup(&self, label: &str) -> std::result::Result<Option<String>, EnrichError>;
}

/// [`DiseaseLookup`] backed by an HTTP query service.
///
/// Issues `GET {base_url}?q=<label>` and reads the name at `name_pointer`
/// in the JSON response.
pub struct HttpDiseaseLookup {
    client: reqwest::Client,
    base_url: String,
    name_pointer: String,
}

impl HttpDiseaseLookup {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MabkgError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            name_pointer: config.name_pointer.clone(),
        })
    }
}

#[async_trait]
impl DiseaseLookup for HttpDiseaseLookup {
    async fn lookup(&self, label: &str) -> std::result::Result<Option<String>, EnrichError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", label)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EnrichError::Decode(e.to_string()))?;

        Ok(body
            .pointer(&self.name_pointer)
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

/// Lookup results for one run, keyed by the queried label.
///
/// `None` entries record labels the service could not resolve.
#[derive(Debug, Default)]
pub struct DiseaseNameCache {
    entries: HashMap<String, Option<String>>,
    hits: usize,
    misses: usize,
}

impl DiseaseNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `label`, counting the hit or miss
    pub fn get(&mut self, label: &str) -> Option<Option<String>> {
        match self.entries.get(label) {
            Some(entry) => {
                self.hits += 1;
                Some(entry.clone())
            },
            None => {
                self.misses += 1;
                None
            },
        }
    }

    pub fn insert(&mut self, label: &str, name: Option<String>) {
        self.entries.insert(label.to_string(), name);
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Documents with a disease object
    pub candidates: usize,
    /// Documents whose disease name was filled in
    pub resolved: usize,
    /// Requests actually sent to the lookup
    pub lookups: usize,
    pub failures: usize,
}

/// Fill `object.name` on every disease-object document.
///
/// The label queried is the existing disease name when present, otherwise
/// the disease id. Lookup failures never abort the pass; they leave the
/// document unchanged. With `retry_failed`, transport failures are not
/// cached and the next document with the same label asks again.
pub async fn enrich_documents(
    docs: &mut [Value],
    lookup: &dyn DiseaseLookup,
    cache: &mut DiseaseNameCache,
    retry_failed: bool,
) -> EnrichStats {
    let mut stats = EnrichStats::default();

    for doc in docs.iter_mut() {
        let Some(object) = doc.get_mut("object").and_then(Value::as_object_mut) else {
            continue;
        };
        if object.get("type").and_then(Value::as_str) != Some("Disease") {
            continue;
        }
        stats.candidates += 1;

        let Some(label) = object
            .get("name")
            .or_else(|| object.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            continue;
        };

        let name = match cache.get(&label) {
            Some(cached) => cached,
            None => {
                stats.lookups += 1;
                match lookup.lookup(&label).await {
                    Ok(name) => {
                        cache.insert(&label, name.clone());
                        name
                    },
                    Err(e) => {
                        stats.failures += 1;
                        if retry_failed && e.is_transient() {
                            warn!(label = %label, error = %e, "Disease lookup failed, will retry");
                        } else {
                            debug!(label = %label, error = %e, "Disease lookup failed");
                            cache.insert(&label, None);
                        }
                        None
                    },
                }
            },
        };

        if let Some(name) = name {
            object.insert("name".to_string(), Value::String(name));
            stats.resolved += 1;
        }
    }

    info!(
        candidates = stats.candidates,
        resolved = stats.resolved,
        lookups = stats.lookups,
        failures = stats.failures,
        cache_hits = cache.hits(),
        "Disease enrichment complete"
    );

    stats
}
