//! Diagnosis service: Turns collected answers into a triaged report.
//!
//! This service coordinates:
//! - Feature encoding against the symptom catalog
//! - Classifier scoring
//! - Top-k ranking
//! - Triage
//! - Description/precaution lookup

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{
    DiagnosisReport, FeatureVector, PredictionRanking, RankingConfig, RiskFactor, SymptomCatalog,
    TriageConfig, TriagePolicy,
};
use crate::ports::{Classifier, ClassifierError, ConditionKnowledge};

/// Inputs to one analysis, taken from a session's accumulated answers.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub symptoms: &'a [String],
    pub risk_factors: &'a BTreeSet<RiskFactor>,
    pub duration_days: u16,
}

/// Anything that can analyze a finished interview.
///
/// The conversation engine only depends on this trait, so tests can drive it
/// without a real model.
pub trait Analyzer: Send + Sync {
    /// Symptom vocabulary used to resolve user selections.
    fn catalog(&self) -> &SymptomCatalog;

    /// Run the full pipeline.
    ///
    /// # Errors
    /// Returns `ClassifierError` when no ranking can be produced.
    fn analyze(&self, input: AnalysisInput<'_>) -> Result<DiagnosisReport, ClassifierError>;
}

/// Service for scoring and triaging symptom selections.
pub struct DiagnosisService<C, K>
where
    C: Classifier,
    K: ConditionKnowledge,
{
    catalog: Arc<SymptomCatalog>,
    classifier: Arc<C>,
    knowledge: Arc<K>,
    ranking: RankingConfig,
    policy: TriagePolicy,
}

impl<C, K> DiagnosisService<C, K>
where
    C: Classifier,
    K: ConditionKnowledge,
{
    /// Create a new diagnosis service.
    pub fn new(
        catalog: Arc<SymptomCatalog>,
        classifier: Arc<C>,
        knowledge: Arc<K>,
        ranking: RankingConfig,
        triage: &TriageConfig,
    ) -> Self {
        Self {
            catalog,
            classifier,
            knowledge,
            ranking,
            policy: TriagePolicy::new(triage),
        }
    }

    /// Score a selection and return the ranked labels.
    ///
    /// # Errors
    /// Returns `ClassifierError` if scoring fails or yields nothing rankable.
    pub fn rank(&self, symptoms: &[String]) -> Result<PredictionRanking, ClassifierError> {
        let features = FeatureVector::encode(symptoms, &self.catalog);
        tracing::debug!("Encoded {} active symptom(s)", features.ones());

        let scores = self.classifier.score(&features)?;
        PredictionRanking::from_scores(&scores, &self.ranking).ok_or(ClassifierError::EmptyOutput)
    }
}

impl<C, K> Analyzer for DiagnosisService<C, K>
where
    C: Classifier,
    K: ConditionKnowledge,
{
    fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    fn analyze(&self, input: AnalysisInput<'_>) -> Result<DiagnosisReport, ClassifierError> {
        let ranking = self.rank(input.symptoms)?;
        let triage = self
            .policy
            .assess(&ranking, input.risk_factors, input.duration_days);

        let disease = triage.primary.clone();
        let report = DiagnosisReport::new(
            triage,
            self.knowledge.description_or_default(&disease),
            self.knowledge.precautions_or_default(&disease),
        );

        tracing::info!(
            "Analysis complete: disease={} tier={} confidence={:.1}%",
            report.disease(),
            report.tier(),
            report.confidence() * 100.0
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ConditionBook;
    use crate::domain::{LabelScore, Rationale, UrgencyTier, FALLBACK_PRECAUTION};

    struct FixedScores(Vec<LabelScore>);

    impl Classifier for FixedScores {
        fn score(&self, _: &FeatureVector) -> Result<Vec<LabelScore>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    fn service(scores: &[(&str, f64)]) -> DiagnosisService<FixedScores, ConditionBook> {
        let catalog = SymptomCatalog::from_identifiers(["itching", "skin_rash", "chest_pain"])
            .expect("Should build");
        let mut book = ConditionBook::default();
        book.read_descriptions("Disease,Description\nFungal infection,Skin fungus.\n".as_bytes())
            .expect("Should parse");
        DiagnosisService::new(
            Arc::new(catalog),
            Arc::new(FixedScores(
                scores.iter().map(|(l, c)| LabelScore::new(*l, *c)).collect(),
            )),
            Arc::new(book),
            RankingConfig::default(),
            &TriageConfig::default(),
        )
    }

    #[test]
    fn test_report_uses_knowledge_and_fallbacks() {
        let svc = service(&[("Fungal infection", 0.8), ("Allergy", 0.1), ("Psoriasis", 0.04)]);
        let symptoms = vec!["itching".to_string()];
        let risks = BTreeSet::new();
        let report = svc
            .analyze(AnalysisInput {
                symptoms: &symptoms,
                risk_factors: &risks,
                duration_days: 2,
            })
            .expect("Should analyze");

        assert_eq!(report.disease(), "Fungal infection");
        assert_eq!(report.description, "Skin fungus.");
        assert_eq!(report.precautions, vec![FALLBACK_PRECAUTION.to_string()]);
        assert_eq!(report.tier(), UrgencyTier::HomeCare);
        assert_eq!(report.triage.secondary.len(), 1);
    }

    #[test]
    fn test_critical_disease_is_emergency() {
        let svc = service(&[("Heart attack", 0.99)]);
        let symptoms = vec!["chest_pain".to_string()];
        let risks = BTreeSet::new();
        let report = svc
            .analyze(AnalysisInput {
                symptoms: &symptoms,
                risk_factors: &risks,
                duration_days: 1,
            })
            .expect("Should analyze");
        assert_eq!(report.tier(), UrgencyTier::Emergency);
        assert_eq!(report.triage.rationale, Rationale::CriticalCondition);
    }

    #[test]
    fn test_empty_scores_are_an_error() {
        let svc = service(&[]);
        let err = svc.rank(&["itching".to_string()]).unwrap_err();
        assert!(matches!(err, ClassifierError::EmptyOutput));
    }
}
