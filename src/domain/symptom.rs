//! Symptom vocabulary.
//!
//! The catalog order is the feature-vector order: position `i` in the catalog
//! is column `i` of every vector handed to the classifier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Errors raised while building the symptom catalog.
///
/// Any of these means the vocabulary is unusable and the engine must not start.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("symptom source not found: {0}")]
    Missing(String),

    #[error("symptom source unreadable: {0}")]
    Unreadable(String),

    #[error("symptom catalog is empty")]
    Empty,

    #[error("duplicate symptom identifier '{0}'")]
    Duplicate(String),

    #[error("display label '{label}' is shared by '{first}' and '{second}'")]
    LabelCollision {
        label: String,
        first: String,
        second: String,
    },
}

/// A known symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    /// Normalized identifier (lowercase, underscore separated)
    pub id: String,

    /// Human-friendly label derived from `id`
    pub label: String,
}

/// Normalize a raw identifier: trim, lowercase, whitespace to `_`, collapse runs of `_`.
#[must_use]
pub fn normalize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        let c = if c.is_whitespace() { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.extend(c.to_lowercase());
    }
    out.trim_matches('_').to_string()
}

/// Derive the display label for an identifier.
///
/// Separators become spaces and every alphabetic run starts upper-case with the
/// rest lower-case: `skin_rash` → `Skin Rash`.
#[must_use]
pub fn display_label(identifier: &str) -> String {
    let spaced = identifier.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev_alpha = false;
    for c in spaced.split_whitespace().collect::<Vec<_>>().join(" ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Ordered, immutable symptom vocabulary.
#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    symptoms: Vec<Symptom>,
    index_by_id: HashMap<String, usize>,
    index_by_label: HashMap<String, usize>,
}

impl SymptomCatalog {
    /// Build a catalog from raw identifiers, preserving their order.
    ///
    /// # Errors
    /// Returns `CatalogError::Empty` for an empty source, `Duplicate` when two
    /// entries normalize to the same identifier and `LabelCollision` when two
    /// identifiers would render the same label.
    pub fn from_identifiers<I, S>(raw: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symptoms = Vec::new();
        let mut index_by_id = HashMap::new();
        let mut index_by_label: HashMap<String, usize> = HashMap::new();

        for entry in raw {
            let id = normalize_identifier(entry.as_ref());
            if id.is_empty() {
                continue;
            }
            if index_by_id.contains_key(&id) {
                return Err(CatalogError::Duplicate(id));
            }

            let label = display_label(&id);
            let label_key = label.to_lowercase();
            if let Some(&existing) = index_by_label.get(&label_key) {
                let first: &Symptom = &symptoms[existing];
                return Err(CatalogError::LabelCollision {
                    label,
                    first: first.id.clone(),
                    second: id,
                });
            }

            let idx = symptoms.len();
            index_by_id.insert(id.clone(), idx);
            index_by_label.insert(label_key, idx);
            symptoms.push(Symptom { id, label });
        }

        if symptoms.is_empty() {
            return Err(CatalogError::Empty);
        }

        tracing::debug!("Built symptom catalog with {} entries", symptoms.len());

        Ok(Self {
            symptoms,
            index_by_id,
            index_by_label,
        })
    }

    /// Number of symptoms (the feature-vector length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Symptoms in vector order.
    #[must_use]
    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Symptom> {
        self.symptoms.get(index)
    }

    /// Vector position of an identifier.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    /// Look up the identifier behind a display label (case-insensitive).
    #[must_use]
    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.index_by_label
            .get(&label.trim().to_lowercase())
            .map(|&i| self.symptoms[i].id.as_str())
    }

    /// Label for a known identifier.
    #[must_use]
    pub fn label_for(&self, id: &str) -> Option<&str> {
        self.index_of(id).map(|i| self.symptoms[i].label.as_str())
    }

    /// Resolve user input (identifier or display label) to a catalog identifier.
    #[must_use]
    pub fn resolve(&self, input: &str) -> Option<&str> {
        if let Some(i) = self.index_by_id.get(input) {
            return Some(self.symptoms[*i].id.as_str());
        }
        if let Some(id) = self.id_for_label(input) {
            return Some(id);
        }
        let normalized = normalize_identifier(input);
        self.index_by_id
            .get(&normalized)
            .map(|&i| self.symptoms[i].id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("skin_rash"), "Skin Rash");
        assert_eq!(display_label("itching"), "Itching");
        assert_eq!(display_label("pain_behind_the_eyes"), "Pain Behind The Eyes");
        assert_eq!(display_label("fluid_overload"), "Fluid Overload");
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(" skin_rash"), "skin_rash");
        assert_eq!(normalize_identifier("spotting_ urination"), "spotting_urination");
        assert_eq!(normalize_identifier("Skin Rash"), "skin_rash");
    }

    #[test]
    fn test_catalog_preserves_order() {
        let catalog = SymptomCatalog::from_identifiers(["itching", "skin_rash", "chills"])
            .expect("Should build");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.index_of("skin_rash"), Some(1));
        assert_eq!(catalog.get(2).map(|s| s.id.as_str()), Some("chills"));
    }

    #[test]
    fn test_label_lookup_inverts_display_label() {
        let catalog = SymptomCatalog::from_identifiers(["itching", "skin_rash", "joint_pain"])
            .expect("Should build");
        for symptom in catalog.symptoms() {
            assert_eq!(catalog.id_for_label(&symptom.label), Some(symptom.id.as_str()));
        }
    }

    #[test]
    fn test_resolve_accepts_ids_and_labels() {
        let catalog = SymptomCatalog::from_identifiers(["itching", "skin_rash"])
            .expect("Should build");
        assert_eq!(catalog.resolve("skin_rash"), Some("skin_rash"));
        assert_eq!(catalog.resolve("Skin Rash"), Some("skin_rash"));
        assert_eq!(catalog.resolve("skin rash"), Some("skin_rash"));
        assert_eq!(catalog.resolve("headache"), None);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            SymptomCatalog::from_identifiers(empty),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            SymptomCatalog::from_identifiers(["  ", ""]),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn test_duplicate_after_normalization_rejected() {
        let result = SymptomCatalog::from_identifiers(["skin_rash", " Skin Rash"]);
        assert!(matches!(result, Err(CatalogError::Duplicate(id)) if id == "skin_rash"));
    }
}
