//! Diagnosis report handed to the presentation layer.
//!
//! This is structured data; formatting it is up to the renderer.

use serde::{Deserialize, Serialize};

use super::triage::{TriageResult, UrgencyTier};

/// Description shown when the knowledge base has no entry for a disease.
pub const FALLBACK_DESCRIPTION: &str = "No details available.";

/// Precaution shown when the knowledge base has none for a disease.
pub const FALLBACK_PRECAUTION: &str = "Rest";

/// Complete result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    /// Unique identifier
    pub id: String,

    /// Triage outcome (primary disease, confidence, tier, rationale, alternates)
    pub triage: TriageResult,

    /// Disease description or the fallback text
    pub description: String,

    /// Recommended actions, never empty
    pub precautions: Vec<String>,

    /// Whether the analysis failed and this is the fail-closed result
    pub degraded: bool,

    /// Timestamp of analysis
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl DiagnosisReport {
    #[must_use]
    pub fn new(triage: TriageResult, description: String, precautions: Vec<String>) -> Self {
        let precautions = if precautions.is_empty() {
            vec![FALLBACK_PRECAUTION.to_string()]
        } else {
            precautions
        };

        Self {
            id: uuid_v4(),
            triage,
            description,
            precautions,
            degraded: false,
            created_at: chrono::Utc::now(),
        }
    }

    /// Fail-closed report: Consult, "unable to complete analysis".
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            degraded: true,
            ..Self::new(
                TriageResult::unavailable(),
                FALLBACK_DESCRIPTION.to_string(),
                Vec::new(),
            )
        }
    }

    #[must_use]
    pub fn disease(&self) -> &str {
        &self.triage.primary
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.triage.confidence
    }

    #[must_use]
    pub fn tier(&self) -> UrgencyTier {
        self.triage.tier
    }
}

/// Generate a random UUID v4 string using a CSPRNG seeded from OS entropy.
pub fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::triage::Rationale;

    #[test]
    fn test_empty_precautions_fall_back_to_rest() {
        let report = DiagnosisReport::new(
            TriageResult::unavailable(),
            "desc".to_string(),
            Vec::new(),
        );
        assert_eq!(report.precautions, vec!["Rest".to_string()]);
        assert!(!report.degraded);
    }

    #[test]
    fn test_unavailable_report() {
        let report = DiagnosisReport::unavailable();
        assert!(report.degraded);
        assert_eq!(report.tier(), UrgencyTier::Consult);
        assert_eq!(report.triage.rationale, Rationale::AnalysisUnavailable);
        assert_eq!(report.description, FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}
