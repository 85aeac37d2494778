//! Rule-based triage.
//!
//! The policy is an ordered decision list; the first matching rule decides:
//!
//! 1. primary disease in the critical set → Emergency
//! 2. confidence below the ambiguity threshold → Consult
//! 3. any elevated risk factor present → Consult
//! 4. symptoms lasting longer than the home-care limit → Consult
//! 5. otherwise → HomeCare

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::patient::RiskFactor;
use super::prediction::{PredictionRanking, RankedLabel};

/// Conditions that always escalate to Emergency.
pub const DEFAULT_CRITICAL_DISEASES: [&str; 11] = [
    "Heart attack",
    "Paralysis (brain hemorrhage)",
    "Alcoholic hepatitis",
    "Hepatitis C",
    "Hepatitis D",
    "Hepatitis E",
    "Typhoid",
    "Tuberculosis",
    "Pneumonia",
    "Dengue",
    "Chicken pox",
];

/// Advisory urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UrgencyTier {
    Emergency,
    Consult,
    Monitor,
    HomeCare,
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emergency => write!(f, "EMERGENCY"),
            Self::Consult => write!(f, "CONSULT"),
            Self::Monitor => write!(f, "MONITOR"),
            Self::HomeCare => write!(f, "HOME CARE"),
        }
    }
}

/// Why a tier was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rationale {
    CriticalCondition,
    AmbiguousPrediction,
    RiskHistory(Vec<RiskFactor>),
    ProlongedSymptoms,
    MonitorAtHome,
    AnalysisUnavailable,
}

impl Rationale {
    /// Short headline for the advice block.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            Self::CriticalCondition => "Immediate Medical Attention Required",
            Self::AmbiguousPrediction | Self::RiskHistory(_) | Self::AnalysisUnavailable => {
                "Consult a Doctor"
            }
            Self::ProlongedSymptoms => "See a Doctor",
            Self::MonitorAtHome => "Home Care Sufficient",
        }
    }

    /// Advice sentence.
    #[must_use]
    pub fn advice(&self) -> String {
        match self {
            Self::CriticalCondition => "Condition severe, seek immediate care.".to_string(),
            Self::AmbiguousPrediction => {
                "Prediction ambiguous; diagnostic tests recommended.".to_string()
            }
            Self::RiskHistory(factors) => {
                let names: Vec<&str> = factors.iter().map(RiskFactor::label).collect();
                format!("Caution due to history ({}).", names.join(", "))
            }
            Self::ProlongedSymptoms => "Symptoms persisted too long.".to_string(),
            Self::MonitorAtHome => "Monitor for 24 hours.".to_string(),
            Self::AnalysisUnavailable => "Unable to complete analysis.".to_string(),
        }
    }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.headline(), self.advice())
    }
}

/// Tunable triage parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub critical_diseases: Vec<String>,
    pub ambiguity_threshold: f64,
    pub elevated_risk_factors: Vec<RiskFactor>,
    pub max_home_care_days: u16,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            critical_diseases: DEFAULT_CRITICAL_DISEASES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            ambiguity_threshold: 0.45,
            elevated_risk_factors: vec![
                RiskFactor::Diabetes,
                RiskFactor::Hypertension,
                RiskFactor::HeartCondition,
                RiskFactor::Smoker,
            ],
            max_home_care_days: 5,
        }
    }
}

/// Tier plus rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageDecision {
    pub tier: UrgencyTier,
    pub rationale: Rationale,
}

/// Outcome of triaging one ranked prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub primary: String,
    pub confidence: f64,
    pub tier: UrgencyTier,
    pub rationale: Rationale,
    pub secondary: Vec<RankedLabel>,
}

impl TriageResult {
    /// Result used when no prediction could be made.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            primary: "Undetermined".to_string(),
            confidence: 0.0,
            tier: UrgencyTier::Consult,
            rationale: Rationale::AnalysisUnavailable,
            secondary: Vec::new(),
        }
    }
}

/// Deterministic triage rules, built once from configuration.
#[derive(Debug, Clone)]
pub struct TriagePolicy {
    critical: BTreeSet<String>,
    ambiguity_threshold: f64,
    elevated: BTreeSet<RiskFactor>,
    max_home_care_days: u16,
}

impl TriagePolicy {
    #[must_use]
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            critical: config
                .critical_diseases
                .iter()
                .map(|d| d.trim().to_string())
                .collect(),
            ambiguity_threshold: config.ambiguity_threshold,
            elevated: config.elevated_risk_factors.iter().copied().collect(),
            max_home_care_days: config.max_home_care_days,
        }
    }

    #[must_use]
    pub fn is_critical(&self, disease: &str) -> bool {
        self.critical.contains(disease.trim())
    }

    /// Apply the decision list.
    #[must_use]
    pub fn classify(
        &self,
        primary_disease: &str,
        primary_confidence: f64,
        risk_factors: &BTreeSet<RiskFactor>,
        duration_days: u16,
    ) -> TriageDecision {
        if self.is_critical(primary_disease) {
            return TriageDecision {
                tier: UrgencyTier::Emergency,
                rationale: Rationale::CriticalCondition,
            };
        }

        if primary_confidence < self.ambiguity_threshold {
            return TriageDecision {
                tier: UrgencyTier::Consult,
                rationale: Rationale::AmbiguousPrediction,
            };
        }

        let matched: Vec<RiskFactor> = risk_factors
            .iter()
            .filter(|r| self.elevated.contains(*r))
            .copied()
            .collect();
        if !matched.is_empty() {
            return TriageDecision {
                tier: UrgencyTier::Consult,
                rationale: Rationale::RiskHistory(matched),
            };
        }

        if duration_days > self.max_home_care_days {
            return TriageDecision {
                tier: UrgencyTier::Consult,
                rationale: Rationale::ProlongedSymptoms,
            };
        }

        TriageDecision {
            tier: UrgencyTier::HomeCare,
            rationale: Rationale::MonitorAtHome,
        }
    }

    /// Triage a ranking, attaching the visible secondary candidates.
    #[must_use]
    pub fn assess(
        &self,
        ranking: &PredictionRanking,
        risk_factors: &BTreeSet<RiskFactor>,
        duration_days: u16,
    ) -> TriageResult {
        let primary = ranking.primary();
        let decision = self.classify(
            &primary.label,
            primary.confidence,
            risk_factors,
            duration_days,
        );

        TriageResult {
            primary: primary.label.clone(),
            confidence: primary.confidence,
            tier: decision.tier,
            rationale: decision.rationale,
            secondary: ranking.secondary(),
        }
    }
}

impl Default for TriagePolicy {
    fn default() -> Self {
        Self::new(&TriageConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::{LabelScore, RankingConfig};

    fn risks(items: &[RiskFactor]) -> BTreeSet<RiskFactor> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_critical_wins_over_everything() {
        let policy = TriagePolicy::default();
        let d = policy.classify("Heart attack", 0.99, &risks(&[]), 1);
        assert_eq!(d.tier, UrgencyTier::Emergency);
        assert_eq!(d.rationale, Rationale::CriticalCondition);

        let d = policy.classify("Dengue", 0.10, &risks(&[RiskFactor::Smoker]), 30);
        assert_eq!(d.tier, UrgencyTier::Emergency);
    }

    #[test]
    fn test_low_confidence_beats_risk_and_duration() {
        let policy = TriagePolicy::default();
        let d = policy.classify(
            "Common Cold",
            0.30,
            &risks(&[RiskFactor::Diabetes, RiskFactor::Smoker]),
            40,
        );
        assert_eq!(d.tier, UrgencyTier::Consult);
        assert_eq!(d.rationale, Rationale::AmbiguousPrediction);
    }

    #[test]
    fn test_risk_factors_name_only_matches() {
        let policy = TriagePolicy::default();
        let d = policy.classify(
            "Common Cold",
            0.9,
            &risks(&[RiskFactor::Asthma, RiskFactor::Hypertension]),
            1,
        );
        assert_eq!(d.tier, UrgencyTier::Consult);
        assert_eq!(d.rationale, Rationale::RiskHistory(vec![RiskFactor::Hypertension]));
        assert_eq!(d.rationale.advice(), "Caution due to history (Hypertension).");
    }

    #[test]
    fn test_risk_history_beats_long_duration() {
        let policy = TriagePolicy::default();
        let d = policy.classify("Acne", 0.9, &risks(&[RiskFactor::Smoker]), 30);
        assert_eq!(d.tier, UrgencyTier::Consult);
        assert_eq!(d.rationale, Rationale::RiskHistory(vec![RiskFactor::Smoker]));
    }

    #[test]
    fn test_non_elevated_risk_is_ignored() {
        let policy = TriagePolicy::default();
        let d = policy.classify(
            "Common Cold",
            0.9,
            &risks(&[RiskFactor::Asthma, RiskFactor::AlcoholConsumer]),
            2,
        );
        assert_eq!(d.tier, UrgencyTier::HomeCare);
    }

    #[test]
    fn test_duration_boundary() {
        let policy = TriagePolicy::default();
        let five = policy.classify("Common Cold", 0.9, &risks(&[]), 5);
        assert_eq!(five.tier, UrgencyTier::HomeCare);
        assert_eq!(five.rationale, Rationale::MonitorAtHome);

        let six = policy.classify("Common Cold", 0.9, &risks(&[]), 6);
        assert_eq!(six.tier, UrgencyTier::Consult);
        assert_eq!(six.rationale, Rationale::ProlongedSymptoms);
        assert_eq!(six.rationale.headline(), "See a Doctor");
    }

    #[test]
    fn test_ambiguity_threshold_is_exclusive() {
        let policy = TriagePolicy::default();
        let d = policy.classify("Common Cold", 0.45, &risks(&[]), 1);
        assert_eq!(d.tier, UrgencyTier::HomeCare);
    }

    #[test]
    fn test_configured_thresholds() {
        let config = TriageConfig {
            critical_diseases: vec!["Migraine".to_string()],
            ambiguity_threshold: 0.6,
            elevated_risk_factors: vec![RiskFactor::Asthma],
            max_home_care_days: 2,
        };
        let policy = TriagePolicy::new(&config);

        assert_eq!(policy.classify("Migraine", 0.9, &risks(&[]), 1).tier, UrgencyTier::Emergency);
        assert!(!policy.is_critical("Heart attack"));
        assert_eq!(
            policy.classify("Acne", 0.5, &risks(&[]), 1).rationale,
            Rationale::AmbiguousPrediction
        );
        assert_eq!(
            policy.classify("Acne", 0.9, &risks(&[RiskFactor::Asthma]), 1).tier,
            UrgencyTier::Consult
        );
        assert_eq!(
            policy.classify("Acne", 0.9, &risks(&[]), 3).rationale,
            Rationale::ProlongedSymptoms
        );
    }

    #[test]
    fn test_policy_is_pure() {
        let policy = TriagePolicy::default();
        let r = risks(&[RiskFactor::Smoker]);
        let a = policy.classify("Allergy", 0.7, &r, 3);
        let b = policy.classify("Allergy", 0.7, &r, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_assess_attaches_secondary() {
        let policy = TriagePolicy::default();
        let scores = vec![
            LabelScore::new("Fungal infection", 0.8),
            LabelScore::new("Allergy", 0.1),
            LabelScore::new("Psoriasis", 0.04),
        ];
        let ranking = PredictionRanking::from_scores(&scores, &RankingConfig::default())
            .expect("Should rank");
        let result = policy.assess(&ranking, &risks(&[]), 2);

        assert_eq!(result.primary, "Fungal infection");
        assert_eq!(result.tier, UrgencyTier::HomeCare);
        assert_eq!(result.secondary.len(), 1);
        assert_eq!(result.secondary[0].label, "Allergy");
    }
}
