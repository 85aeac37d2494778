//! Classifier port: Trait for the scored-classification model.
//!
//! The model itself is opaque; the core only needs label scores for a
//! feature vector.

use std::time::Duration;

use crate::domain::{FeatureVector, LabelScore};

/// Errors from a classifier call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier did not answer within {0:?}")]
    Timeout(Duration),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("classifier returned no scores")]
    EmptyOutput,

    #[error("feature vector has length {actual}, model expects {expected}")]
    FeatureLength { expected: usize, actual: usize },
}

/// Trait for scoring a feature vector.
///
/// Implementations return one score per known disease label, in the model's
/// own label order. That order is the tie-break order when ranking. Scores are
/// non-negative but need not sum to one.
pub trait Classifier: Send + Sync {
    /// Score a feature vector.
    ///
    /// # Errors
    /// Returns `ClassifierError` when the model cannot produce scores.
    fn score(&self, features: &FeatureVector) -> Result<Vec<LabelScore>, ClassifierError>;
}
