//! Deadline wrapper for classifiers.
//!
//! Runs each inference on its own thread and gives up after a fixed timeout,
//! so a stalled model surfaces as `ClassifierError::Timeout` instead of
//! hanging the conversation.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::domain::{FeatureVector, LabelScore};
use crate::ports::{Classifier, ClassifierError};

/// Classifier that enforces a per-call deadline on an inner classifier.
pub struct DeadlineClassifier<C> {
    inner: Arc<C>,
    timeout: Duration,
}

impl<C> DeadlineClassifier<C>
where
    C: Classifier + 'static,
{
    #[must_use]
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<C> Classifier for DeadlineClassifier<C>
where
    C: Classifier + 'static,
{
    fn score(&self, features: &FeatureVector) -> Result<Vec<LabelScore>, ClassifierError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let features = features.clone();

        thread::Builder::new()
            .name("medichat-inference".into())
            .spawn(move || {
                // The receiver may be gone after a timeout.
                let _ = tx.send(inner.score(&features));
            })
            .map_err(|e| ClassifierError::Unavailable(format!("cannot start inference: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!("Inference exceeded {:?}", self.timeout);
                Err(ClassifierError::Timeout(self.timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ClassifierError::Inference(
                "inference thread terminated without a result".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Classifier for Fixed {
        fn score(&self, _: &FeatureVector) -> Result<Vec<LabelScore>, ClassifierError> {
            Ok(vec![LabelScore::new("Allergy", 0.9)])
        }
    }

    struct Slow;

    impl Classifier for Slow {
        fn score(&self, _: &FeatureVector) -> Result<Vec<LabelScore>, ClassifierError> {
            thread::sleep(Duration::from_millis(500));
            Ok(Vec::new())
        }
    }

    struct Panicking;

    impl Classifier for Panicking {
        fn score(&self, _: &FeatureVector) -> Result<Vec<LabelScore>, ClassifierError> {
            panic!("model crashed");
        }
    }

    #[test]
    fn test_fast_classifier_passes_through() {
        let classifier = DeadlineClassifier::new(Fixed, Duration::from_secs(2));
        let scores = classifier
            .score(&FeatureVector::from_bits(vec![1]))
            .expect("Should score");
        assert_eq!(scores[0].label, "Allergy");
    }

    #[test]
    fn test_slow_classifier_times_out() {
        let classifier = DeadlineClassifier::new(Slow, Duration::from_millis(20));
        let err = classifier
            .score(&FeatureVector::from_bits(vec![1]))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Timeout(_)));
    }

    #[test]
    fn test_panicking_classifier_is_an_error() {
        let classifier = DeadlineClassifier::new(Panicking, Duration::from_secs(2));
        let err = classifier
            .score(&FeatureVector::from_bits(vec![1]))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }
}
