//! Binary symptom feature vectors.

use serde::{Deserialize, Serialize};

use super::symptom::SymptomCatalog;

/// Presence/absence vector aligned to catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    /// Encode selected symptom identifiers against the catalog.
    ///
    /// Identifiers the catalog does not know are skipped. Output order follows
    /// the catalog, never the selection.
    #[must_use]
    pub fn encode<S: AsRef<str>>(selection: &[S], catalog: &SymptomCatalog) -> Self {
        let mut bits = vec![0u8; catalog.len()];
        let mut ignored = 0usize;

        for id in selection {
            match catalog.index_of(id.as_ref()) {
                Some(i) => bits[i] = 1,
                None => ignored += 1,
            }
        }

        if ignored > 0 {
            tracing::debug!("Ignored {} symptom(s) not present in the catalog", ignored);
        }

        Self(bits)
    }

    /// Build a vector from raw values (used by classifier tests and adapters).
    #[must_use]
    pub fn from_bits(bits: Vec<u8>) -> Self {
        Self(bits)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of set entries.
    #[must_use]
    pub fn ones(&self) -> usize {
        self.0.iter().filter(|&&b| b == 1).count()
    }

    /// Indices of set entries, ascending.
    #[must_use]
    pub fn active_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| (b == 1).then_some(i))
            .collect()
    }

    /// Identifiers of the set entries, in catalog order.
    #[must_use]
    pub fn decode<'c>(&self, catalog: &'c SymptomCatalog) -> Vec<&'c str> {
        self.active_indices()
            .into_iter()
            .filter_map(|i| catalog.get(i).map(|s| s.id.as_str()))
            .collect()
    }
}
