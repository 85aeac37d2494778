//! Knowledge port: Disease descriptions and precautions.

use crate::domain::{FALLBACK_DESCRIPTION, FALLBACK_PRECAUTION};

/// Lookup of reference text keyed by disease label.
///
/// Missing entries are normal (the classifier may know labels the reference
/// tables do not); the `_or_default` methods apply the documented fallbacks.
pub trait ConditionKnowledge: Send + Sync {
    /// Description of a disease, if known.
    fn description(&self, disease: &str) -> Option<&str>;

    /// Precautions for a disease, if known.
    fn precautions(&self, disease: &str) -> Option<&[String]>;

    /// Description or "No details available.".
    fn description_or_default(&self, disease: &str) -> String {
        self.description(disease)
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string())
    }

    /// Precautions or `["Rest"]`. Never empty.
    fn precautions_or_default(&self, disease: &str) -> Vec<String> {
        match self.precautions(disease) {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => vec![FALLBACK_PRECAUTION.to_string()],
        }
    }
}
