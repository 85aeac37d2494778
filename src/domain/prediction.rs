//! Ranking of classifier scores.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw score for one label, as produced by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub confidence: f64,
}

impl LabelScore {
    #[must_use]
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// A label with its rank position (0 = primary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLabel {
    pub rank: usize,
    pub label: String,
    pub confidence: f64,
}

impl RankedLabel {
    /// Confidence as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

impl fmt::Display for RankedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.label, self.percent())
    }
}

/// Ranking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// How many labels to keep
    pub top_k: usize,

    /// Secondary candidates must score strictly above this
    pub secondary_threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            secondary_threshold: 0.05,
        }
    }
}

/// Top labels in descending confidence. Never empty.
///
/// Only built through [`PredictionRanking::from_scores`], which is what keeps
/// `primary()` infallible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRanking {
    entries: Vec<RankedLabel>,
    secondary_threshold: f64,
}

impl PredictionRanking {
    /// Rank raw scores.
    ///
    /// The sort is stable, so equal confidences keep the classifier's label
    /// order. Non-finite scores are dropped. Returns `None` when nothing is left.
    #[must_use]
    pub fn from_scores(scores: &[LabelScore], config: &RankingConfig) -> Option<Self> {
        let mut ordered: Vec<&LabelScore> = scores
            .iter()
            .filter(|s| {
                let finite = s.confidence.is_finite();
                if !finite {
                    tracing::warn!("Dropping non-finite score for label '{}'", s.label);
                }
                finite
            })
            .collect();

        ordered.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let entries: Vec<RankedLabel> = ordered
            .into_iter()
            .take(config.top_k.max(1))
            .enumerate()
            .map(|(rank, s)| RankedLabel {
                rank,
                label: s.label.clone(),
                confidence: s.confidence,
            })
            .collect();

        if entries.is_empty() {
            return None;
        }

        Some(Self {
            entries,
            secondary_threshold: config.secondary_threshold,
        })
    }

    /// Rank-1 label.
    #[must_use]
    pub fn primary(&self) -> &RankedLabel {
        &self.entries[0]
    }

    /// All kept entries, including ones below the visibility threshold.
    #[must_use]
    pub fn entries(&self) -> &[RankedLabel] {
        &self.entries
    }

    /// Ranks 2..k whose confidence exceeds the secondary threshold.
    #[must_use]
    pub fn secondary(&self) -> Vec<RankedLabel> {
        self.entries
            .iter()
            .skip(1)
            .filter(|e| e.confidence > self.secondary_threshold)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(&str, f64)]) -> Vec<LabelScore> {
        values.iter().map(|(l, c)| LabelScore::new(*l, *c)).collect()
    }

    #[test]
    fn test_top_three_with_stable_ties() {
        let raw = scores(&[("A", 0.7), ("B", 0.5), ("C", 0.5), ("D", 0.03)]);
        let ranking =
            PredictionRanking::from_scores(&raw, &RankingConfig::default()).expect("Should rank");

        let labels: Vec<&str> = ranking.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(ranking.primary().label, "A");
        assert!(ranking.secondary().iter().all(|e| e.label != "D"));
    }

    #[test]
    fn test_tie_break_follows_label_order_not_name() {
        let raw = scores(&[("Zeta", 0.4), ("Alpha", 0.4)]);
        let ranking =
            PredictionRanking::from_scores(&raw, &RankingConfig::default()).expect("Should rank");
        assert_eq!(ranking.primary().label, "Zeta");
    }

    #[test]
    fn test_secondary_threshold_is_strict() {
        let raw = scores(&[("A", 0.8), ("B", 0.05), ("C", 0.051)]);
        let ranking =
            PredictionRanking::from_scores(&raw, &RankingConfig::default()).expect("Should rank");
        let secondary: Vec<String> = ranking.secondary().iter().map(|e| e.label.clone()).collect();
        assert_eq!(secondary, vec!["C".to_string()]);
    }

    #[test]
    fn test_secondary_formatting() {
        let raw = scores(&[("Fungal infection", 0.8), ("Allergy", 0.1), ("Psoriasis", 0.04)]);
        let ranking =
            PredictionRanking::from_scores(&raw, &RankingConfig::default()).expect("Should rank");
        let shown: Vec<String> = ranking.secondary().iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["Allergy (10.0%)".to_string()]);
    }

    #[test]
    fn test_scores_are_not_renormalized() {
        let raw = scores(&[("A", 3.5), ("B", 1.2)]);
        let ranking =
            PredictionRanking::from_scores(&raw, &RankingConfig::default()).expect("Should rank");
        assert!((ranking.primary().confidence - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_top_k_still_keeps_primary() {
        let config = RankingConfig {
            top_k: 0,
            ..RankingConfig::default()
        };
        let raw = scores(&[("A", 0.2), ("B", 0.6)]);
        let ranking = PredictionRanking::from_scores(&raw, &config).expect("Should rank");
        assert_eq!(ranking.entries().len(), 1);
        assert_eq!(ranking.primary().label, "B");
    }

    #[test]
    fn test_empty_or_nan_scores_give_none() {
        assert!(PredictionRanking::from_scores(&[], &RankingConfig::default()).is_none());
        let raw = scores(&[("A", f64::NAN)]);
        assert!(PredictionRanking::from_scores(&raw, &RankingConfig::default()).is_none());
    }
}
