//! Epitope cells
//!
//! The cell is `protein, domain, free text`, where the free text may itself
//! contain commas:
//!
//! ```text
//! Envelope protein E
//! Envelope protein E, Fusion loop domain (98-DRXW-101)
//! Envelope protein E, EDIII domain, This antibody neutralizes dengue virus serotypes 1, 2 and 3.
//! ```

use serde::{Deserialize, Serialize};

/// Structured epitope: the antigen protein, the domain on it, and any
/// trailing description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epitope {
    pub protein: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
}

impl Epitope {
    pub fn is_empty(&self) -> bool {
        self.protein.is_none() && self.domain.is_none() && self.description.is_none()
    }
}

/// Parse an epitope cell. Absent parts stay `None`.
pub fn parse_epitope(raw: Option<&str>) -> Epitope {
    let Some(raw) = raw else {
        return Epitope::default();
    };

    let mut segments: Vec<&str> = raw.split(',').collect();

    let tail = if segments.len() > 3 {
        // Everything past the second segment is one description; put its
        // commas back.
        let mut popped = Vec::with_capacity(segments.len() - 2);
        while segments.len() > 2 {
            if let Some(segment) = segments.pop() {
                popped.push(segment);
            }
        }
        popped.reverse();
        Some(popped.join(","))
    } else {
        None
    };

    let mut parts = segments
        .into_iter()
        .map(str::to_string)
        .chain(tail)
        .map(|part| part.trim().to_string())
        .map(|part| (!part.is_empty()).then_some(part));

    Epitope {
        protein: parts.next().flatten(),
        domain: parts.next().flatten(),
        description: parts.next().flatten(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protein_only() {
        let epitope = parse_epitope(Some("Envelope protein E"));
        assert_eq!(epitope.protein.as_deref(), Some("Envelope protein E"));
        assert_eq!(epitope.domain, None);
        assert_eq!(epitope.description, None);
    }

    #[test]
    fn test_protein_and_domain() {
        let epitope = parse_epitope(Some("Envelope protein E, Fusion loop domain (98-DRXW-101)"));
        assert_eq!(epitope.protein.as_deref(), Some("Envelope protein E"));
        assert_eq!(epitope.domain.as_deref(), Some("Fusion loop domain (98-DRXW-101)"));
        assert_eq!(epitope.description, None);
    }

    #[test]
    fn test_description_keeps_its_commas() {
        let epitope = parse_epitope(Some(
            "Envelope protein E, EDIII domain, neutralizes serotypes 1, 2 and 3",
        ));
        assert_eq!(
            epitope,
            Epitope {
                protein: Some("Envelope protein E".to_string()),
                domain: Some("EDIII domain".to_string()),
                description: Some("neutralizes serotypes 1, 2 and 3".to_string()),
            }
        );
    }

    #[test]
    fn test_exactly_three_segments() {
        let epitope = parse_epitope(Some("NS1, wing domain, cross-reactive"));
        assert_eq!(epitope.description.as_deref(), Some("cross-reactive"));
    }

    #[test]
    fn test_empty_segments_become_none() {
        let epitope = parse_epitope(Some(", EDIII domain"));
        assert_eq!(epitope.protein, None);
        assert_eq!(epitope.domain.as_deref(), Some("EDIII domain"));
    }

    #[test]
    fn test_missing_or_blank_cell() {
        assert!(parse_epitope(None).is_empty());
        assert!(parse_epitope(Some("")).is_empty());
        assert!(parse_epitope(Some("  ")).is_empty());
    }
}
