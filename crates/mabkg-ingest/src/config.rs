//! Ingest configuration
//!
//! Resolved in three layers: an optional TOML file, `MABKG_*` environment
//! variables, then command-line flags (applied by the binary).

use mabkg_common::{MabkgError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default disease metadata service queried during enrichment.
pub const DEFAULT_ENRICHMENT_URL: &str = "https://mydisease.info/v1/query";

/// JSON pointer to the disease name inside the enrichment response.
pub const DEFAULT_NAME_POINTER: &str = "/hits/0/disease_ontology/name";

pub const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 30;

/// Input column names for the antibody table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub antibody_uid: String,
    pub antibody_name: String,
    pub virus_id: String,
    pub virus_name: String,
    pub family: String,
    pub species: String,
    pub cross_reference: String,
    pub target: String,
    pub epitope: String,
    pub pubmed: String,
    pub disease_id: String,
    pub disease_name: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            antibody_uid: "mab_uid".to_string(),
            antibody_name: "mab_name".to_string(),
            virus_id: "virus_id".to_string(),
            virus_name: "virus_name".to_string(),
            family: "Family".to_string(),
            species: "Species".to_string(),
            cross_reference: "Protein_RefID".to_string(),
            target: "Target".to_string(),
            epitope: "Epitope".to_string(),
            pubmed: "pubmed_id".to_string(),
            disease_id: "disease_id".to_string(),
            disease_name: "disease_name".to_string(),
        }
    }
}

/// Which antibody column identifies the antibody in `_id` and `subject.id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AntibodyKey {
    #[default]
    Name,
    Uid,
}

impl std::str::FromStr for AntibodyKey {
    type Err = MabkgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(AntibodyKey::Name),
            "uid" | "id" => Ok(AntibodyKey::Uid),
            _ => Err(MabkgError::config(format!("Invalid antibody key: {}", s))),
        }
    }
}

/// Relation families a row can produce documents for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationFamily {
    AntibodyProtein,
    ProteinVirus,
    VirusDisease,
    AntibodyVirus,
    /// Opt-in; not part of the default set.
    AntibodyDisease,
}

impl RelationFamily {
    pub const CORE: [RelationFamily; 4] = [
        RelationFamily::AntibodyProtein,
        RelationFamily::ProteinVirus,
        RelationFamily::VirusDisease,
        RelationFamily::AntibodyVirus,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DedupConfig {
    pub enabled: bool,
    pub antibody_key: AntibodyKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    pub name_pointer: String,

    /// Leave transport failures uncached so a later occurrence of the same
    /// label re-issues the request. Not-found results are always cached.
    pub retry_failed: bool,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: DEFAULT_ENRICHMENT_URL.to_string(),
            timeout_secs: DEFAULT_ENRICHMENT_TIMEOUT_SECS,
            name_pointer: DEFAULT_NAME_POINTER.to_string(),
            retry_failed: false,
        }
    }
}

/// Full configuration for one conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// "tab", "comma", or a single ASCII character
    pub delimiter: String,
    pub columns: ColumnMap,
    pub families: Vec<RelationFamily>,
    pub dedup: DedupConfig,
    pub enrichment: EnrichmentConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: "tab".to_string(),
            columns: ColumnMap::default(),
            families: RelationFamily::CORE.to_vec(),
            dedup: DedupConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Load from a TOML file; missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            MabkgError::config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Apply environment overrides
    ///
    /// - `MABKG_DELIMITER`: tab, comma, or a single character
    /// - `MABKG_DEDUP`: true/false
    /// - `MABKG_ANTIBODY_KEY`: name or uid
    /// - `MABKG_ENRICH`: true/false
    /// - `MABKG_ENRICH_URL`: enrichment service base URL
    pub fn merge_env(mut self) -> Result<Self> {
        if let Ok(delimiter) = std::env::var("MABKG_DELIMITER") {
            self.delimiter = delimiter;
        }

        if let Ok(val) = std::env::var("MABKG_DEDUP") {
            self.dedup.enabled = parse_bool("MABKG_DEDUP", &val)?;
        }

        if let Ok(key) = std::env::var("MABKG_ANTIBODY_KEY") {
            self.dedup.antibody_key = key.parse()?;
        }

        if let Ok(val) = std::env::var("MABKG_ENRICH") {
            self.enrichment.enabled = parse_bool("MABKG_ENRICH", &val)?;
        }

        if let Ok(url) = std::env::var("MABKG_ENRICH_URL") {
            self.enrichment.base_url = url;
        }

        Ok(self)
    }

    /// Field delimiter as the single byte the table reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_str() {
            "tab" | "\\t" | "\t" => Ok(b'\t'),
            "comma" | "," => Ok(b','),
            other => {
                let mut bytes = other.bytes();
                match (bytes.next(), bytes.next()) {
                    (Some(b), None) if b.is_ascii() => Ok(b),
                    _ => Err(MabkgError::config(format!(
                        "Delimiter must be 'tab', 'comma' or one ASCII character, got '{}'",
                        other
                    ))),
                }
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;

        if self.families.is_empty() {
            return Err(MabkgError::config("At least one relation family must be enabled"));
        }

        let required = [
            ("antibody_uid", &self.columns.antibody_uid),
            ("antibody_name", &self.columns.antibody_name),
            ("virus_id", &self.columns.virus_id),
            ("virus_name", &self.columns.virus_name),
        ];
        for (key, column) in required {
            if column.trim().is_empty() {
                return Err(MabkgError::config(format!("Column name for {} cannot be empty", key)));
            }
        }

        if self.enrichment.enabled {
            if self.enrichment.base_url.is_empty() {
                return Err(MabkgError::config("Enrichment base URL cannot be empty"));
            }
            if self.enrichment.timeout_secs == 0 {
                return Err(MabkgError::config("Enrichment timeout must be greater than 0"));
            }
            if !self.enrichment.name_pointer.starts_with('/') {
                return Err(MabkgError::config(
                    "Enrichment name pointer must be a JSON pointer starting with '/'",
                ));
            }
        }

        Ok(())
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MabkgError::config(format!("{} must be a boolean, got '{}'", var, value))),
    }
}
