//! Row to document synthesis

use super::{
    Antibody, Disease, Protein, Relation, RelationDocument, RelationFacts, Virus,
};
use crate::config::{AntibodyKey, ColumnMap, IngestConfig, RelationFamily};
use crate::fields::{parse_cross_reference, parse_epitope, parse_pubmed_ids, parse_targets};
use crate::validate::ValidRow;
use tracing::trace;

/// Documents produced from one row, in emission order
#[derive(Debug, Default)]
pub struct SynthesizedRow {
    pub documents: Vec<RelationDocument>,
    /// Documents suppressed because the disease is pending curation
    pub excluded: usize,
}

impl IntoIterator for SynthesizedRow {
    type Item = RelationDocument;
    type IntoIter = std::vec::IntoIter<RelationDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

/// Builds relation documents from validated rows.
///
/// Per row, in order: one antibody→protein document per UniProt target, one
/// protein→virus document per UniProt target, at most one virus→disease
/// document, exactly one antibody→virus document, and (when enabled) at most
/// one antibody→disease document.
#[derive(Debug, Clone)]
pub struct DocumentSynthesizer {
    columns: ColumnMap,
    families: Vec<RelationFamily>,
    antibody_key: AntibodyKey,
}

impl DocumentSynthesizer {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            families: config.families.clone(),
            antibody_key: config.dedup.antibody_key,
        }
    }

    fn enabled(&self, family: RelationFamily) -> bool {
        self.families.contains(&family)
    }

    pub fn synthesize(&self, valid: &ValidRow) -> SynthesizedRow {
        let row = valid.row();
        let cols = &self.columns;
        let mut out = SynthesizedRow::default();

        let pubmed = parse_pubmed_ids(row.get(&cols.pubmed));
        let epitope = Some(parse_epitope(row.get(&cols.epitope))).filter(|e| !e.is_empty());

        let antibody_facts = RelationFacts {
            pubmed: pubmed.clone(),
            epitope,
        };
        let plain_facts = RelationFacts {
            pubmed,
            epitope: None,
        };

        let antibody = self.antibody(valid);
        let virus = Virus {
            id: row.non_empty(&cols.virus_id).unwrap_or_default().to_string(),
            name: row.non_empty(&cols.virus_name).unwrap_or_default().to_string(),
            family: row.non_empty(&cols.family).map(str::to_string),
            species: row.non_empty(&cols.species).map(str::to_string),
        };
        let disease = row.non_empty(&cols.disease_id).map(|id| Disease {
            id: id.to_string(),
            name: row.non_empty(&cols.disease_name).map(str::to_string),
        });

        let proteins: Vec<Protein> = parse_targets(row.get(&cols.target))
            .into_iter()
            .map(|target| Protein { id: target.id })
            .collect();

        if self.enabled(RelationFamily::AntibodyProtein) {
            out.documents.extend(proteins.iter().map(|protein| {
                RelationDocument::AntibodyProtein(Relation::new(
                    antibody.clone(),
                    protein.clone(),
                    antibody_facts.clone(),
                ))
            }));
        }

        if self.enabled(RelationFamily::ProteinVirus) {
            out.documents.extend(proteins.iter().map(|protein| {
                RelationDocument::ProteinVirus(Relation::new(
                    protein.clone(),
                    virus.clone(),
                    plain_facts.clone(),
                ))
            }));
        }

        if self.enabled(RelationFamily::VirusDisease) {
            if let Some(disease) = self.curated(disease.as_ref(), &mut out) {
                out.documents.push(RelationDocument::VirusDisease(Relation::new(
                    virus.clone(),
                    disease,
                    plain_facts.clone(),
                )));
            }
        }

        if self.enabled(RelationFamily::AntibodyVirus) {
            out.documents.push(RelationDocument::AntibodyVirus(Relation::new(
                antibody.clone(),
                virus,
                antibody_facts,
            )));
        }

        if self.enabled(RelationFamily::AntibodyDisease) {
            if let Some(disease) = self.curated(disease.as_ref(), &mut out) {
                out.documents.push(RelationDocument::AntibodyDisease(Relation::new(
                    antibody,
                    disease,
                    plain_facts,
                )));
            }
        }

        trace!(
            index = row.index(),
            documents = out.documents.len(),
            excluded = out.excluded,
            "Synthesized row"
        );

        out
    }

    fn antibody(&self, valid: &ValidRow) -> Antibody {
        let row = valid.row();
        let cols = &self.columns;
        let cross_reference = parse_cross_reference(row.get(&cols.cross_reference));
        let name = row.non_empty(&cols.antibody_name).map(str::to_string);
        let uid = row.non_empty(&cols.antibody_uid).unwrap_or_default().to_string();

        match (self.antibody_key, name) {
            // Unnamed antibodies are keyed by UID
            (AntibodyKey::Name, name) => Antibody {
                id: name.unwrap_or(uid),
                name: None,
                cross_reference,
            },
            (AntibodyKey::Uid, name) => Antibody {
                id: uid,
                name,
                cross_reference,
            },
        }
    }

    /// The disease, unless it is absent or still pending curation
    fn curated(&self, disease: Option<&Disease>, out: &mut SynthesizedRow) -> Option<Disease> {
        let disease = disease?;
        if disease.is_pending_curation() {
            out.excluded += 1;
            return None;
        }
        Some(disease.clone())
    }
}
