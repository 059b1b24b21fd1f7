//! Relation documents
//!
//! A document states one subject–predicate–object fact plus its supporting
//! citations. Each relation family has its own typed subject and object;
//! [`RelationDocument`] is the union over the families and is flattened to
//! JSON only at emission time.

pub mod synth;

pub use synth::{DocumentSynthesizer, SynthesizedRow};

use crate::config::RelationFamily;
use crate::fields::{CrossReferences, Epitope};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder found in disease identifiers that are still pending curation
/// (`W-TBD` through `Z-TBD`). Such identifiers never reach the output.
pub const PENDING_CURATION_MARKER: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Antibody,
    Protein,
    Virus,
    Disease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    #[serde(rename = "targets")]
    Targets,
    #[serde(rename = "causes")]
    Causes,
    #[serde(rename = "treats")]
    Treats,
    #[serde(rename = "exhibits")]
    Exhibits,
    #[serde(rename = "ameliorates")]
    Ameliorates,
    #[serde(rename = "interacts with")]
    InteractsWith,
}

impl Predicate {
    pub fn as_str(self) -> &'static str {
        match self {
            Predicate::Targets => "targets",
            Predicate::Causes => "causes",
            Predicate::Treats => "treats",
            Predicate::Exhibits => "exhibits",
            Predicate::Ameliorates => "ameliorates",
            Predicate::InteractsWith => "interacts with",
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat, serializable view of any entity. Absent attributes serialize as
/// `null` and are stripped by the document filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReference {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: Option<String>,
    pub family: Option<String>,
    pub species: Option<String>,
    pub cross_reference: Option<CrossReferences>,
}

impl EntityReference {
    fn bare(id: &str, entity_type: EntityType) -> Self {
        Self {
            id: id.to_string(),
            entity_type,
            name: None,
            family: None,
            species: None,
            cross_reference: None,
        }
    }
}

/// Common surface of the typed entities
pub trait Entity {
    fn id(&self) -> &str;
    fn reference(&self) -> EntityReference;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Antibody {
    /// Antibody name or UID, depending on the configured antibody key
    pub id: String,
    /// Display name, set when `id` is the UID
    pub name: Option<String>,
    pub cross_reference: CrossReferences,
}

impl Entity for Antibody {
    fn id(&self) -> &str {
        &self.id
    }

    fn reference(&self) -> EntityReference {
        EntityReference {
            name: self.name.clone(),
            cross_reference: Some(self.cross_reference.clone()),
            ..EntityReference::bare(&self.id, EntityType::Antibody)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protein {
    /// Namespace-qualified, e.g. `UniProtKB:P17763`
    pub id: String,
}

impl Entity for Protein {
    fn id(&self) -> &str {
        &self.id
    }

    fn reference(&self) -> EntityReference {
        EntityReference::bare(&self.id, EntityType::Protein)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Virus {
    /// Taxonomy identifier; validated as an integer upstream
    pub id: String,
    pub name: String,
    pub family: Option<String>,
    pub species: Option<String>,
}

impl Entity for Virus {
    fn id(&self) -> &str {
        &self.id
    }

    fn reference(&self) -> EntityReference {
        EntityReference {
            name: Some(self.name.clone()),
            family: self.family.clone(),
            species: self.species.clone(),
            ..EntityReference::bare(&self.id, EntityType::Virus)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disease {
    pub id: String,
    pub name: Option<String>,
}

impl Disease {
    pub fn is_pending_curation(&self) -> bool {
        self.id.contains(PENDING_CURATION_MARKER)
    }
}

impl Entity for Disease {
    fn id(&self) -> &str {
        &self.id
    }

    fn reference(&self) -> EntityReference {
        EntityReference {
            name: self.name.clone(),
            ..EntityReference::bare(&self.id, EntityType::Disease)
        }
    }
}

/// Supporting facts for one observation of a relation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationFacts {
    pub pubmed: Vec<String>,
    pub epitope: Option<Epitope>,
}

/// A typed subject–object pair with its facts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation<S, O> {
    pub subject: S,
    pub object: O,
    pub relation: RelationFacts,
}

impl<S: Entity, O: Entity> Relation<S, O> {
    pub fn new(subject: S, object: O, relation: RelationFacts) -> Self {
        Self {
            subject,
            object,
            relation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationDocument {
    AntibodyProtein(Relation<Antibody, Protein>),
    ProteinVirus(Relation<Protein, Virus>),
    VirusDisease(Relation<Virus, Disease>),
    AntibodyVirus(Relation<Antibody, Virus>),
    AntibodyDisease(Relation<Antibody, Disease>),
}

#[derive(Serialize)]
struct DocumentRecord<'a> {
    #[serde(rename = "_id")]
    id: String,
    subject: EntityReference,
    relation: &'a RelationFacts,
    object: EntityReference,
    predicate: Option<Predicate>,
}

impl RelationDocument {
    pub fn family(&self) -> RelationFamily {
        match self {
            RelationDocument::AntibodyProtein(_) => RelationFamily::AntibodyProtein,
            RelationDocument::ProteinVirus(_) => RelationFamily::ProteinVirus,
            RelationDocument::VirusDisease(_) => RelationFamily::VirusDisease,
            RelationDocument::AntibodyVirus(_) => RelationFamily::AntibodyVirus,
            RelationDocument::AntibodyDisease(_) => RelationFamily::AntibodyDisease,
        }
    }

    pub fn predicate(&self) -> Option<Predicate> {
        match self.family() {
            RelationFamily::AntibodyProtein | RelationFamily::AntibodyVirus => {
                Some(Predicate::Targets)
            },
            RelationFamily::VirusDisease => Some(Predicate::Causes),
            RelationFamily::AntibodyDisease => Some(Predicate::Treats),
            RelationFamily::ProteinVirus => None,
        }
    }

    fn parts(&self) -> (&dyn Entity, &dyn Entity, &RelationFacts) {
        match self {
            RelationDocument::AntibodyProtein(r) => (&r.subject, &r.object, &r.relation),
            RelationDocument::ProteinVirus(r) => (&r.subject, &r.object, &r.relation),
            RelationDocument::VirusDisease(r) => (&r.subject, &r.object, &r.relation),
            RelationDocument::AntibodyVirus(r) => (&r.subject, &r.object, &r.relation),
            RelationDocument::AntibodyDisease(r) => (&r.subject, &r.object, &r.relation),
        }
    }

    /// `<subject id>-<object id>`; also the merge key for deduplication
    pub fn id(&self) -> String {
        let (subject, object, _) = self.parts();
        format!("{}-{}", subject.id(), object.id())
    }

    pub fn subject(&self) -> EntityReference {
        self.parts().0.reference()
    }

    pub fn object(&self) -> EntityReference {
        self.parts().1.reference()
    }

    pub fn relation(&self) -> &RelationFacts {
        self.parts().2
    }

    /// Unfiltered JSON with keys in emission order:
    /// `_id, subject, relation, object, predicate`.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(DocumentRecord {
            id: self.id(),
            subject: self.subject(),
            relation: self.relation(),
            object: self.object(),
            predicate: self.predicate(),
        })
    }
}
