//! JSON linear classifier adapter.
//!
//! The exported model is a one-vs-rest linear layer over the binary symptom
//! vector, followed by either a softmax across labels or an independent
//! sigmoid per label:
//!
//! ```json
//! {
//!   "version": 1,
//!   "activation": "softmax",
//!   "features": ["itching", "skin_rash", ...],
//!   "labels": [
//!     { "label": "Fungal infection", "bias": -1.2, "weights": { "itching": 2.4 } }
//!   ]
//! }
//! ```
//!
//! Feature names and weight keys are normalized like catalog identifiers. The
//! feature list must then equal the symptom catalog order exactly; a model
//! trained against a different catalog is refused at load time.

mod manifest;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{normalize_identifier, FeatureVector, LabelScore, SymptomCatalog};
use crate::ports::{Classifier, ClassifierError};

pub use manifest::{sha256_hex, verify_manifest, AssetManifest, MANIFEST_FILE};

pub const MODEL_FILE: &str = "model.json";
const MODEL_VERSION: u32 = 1;

/// Errors loading or validating the exported model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid model format: {0}")]
    Format(String),

    #[error("unsupported model version {0}")]
    UnsupportedVersion(u32),

    #[error("model features do not match the symptom catalog ({0})")]
    FeatureMismatch(String),

    #[error("label '{label}' weights unknown feature '{feature}'")]
    UnknownFeature { label: String, feature: String },

    #[error("model has no labels")]
    NoLabels,

    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),

    #[error("non-finite parameter for label '{0}'")]
    NonFinite(String),

    #[error("manifest.json is required but missing")]
    ManifestMissing,

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("hash mismatch for {0}")]
    HashMismatch(String),
}

/// Output activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Softmax,
    Sigmoid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLabel {
    pub label: String,
    #[serde(default)]
    pub bias: f64,
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

/// Model parameters as written by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedModel {
    pub version: u32,
    pub activation: Activation,
    pub features: Vec<String>,
    pub labels: Vec<ExportedLabel>,
}

/// Loaded, catalog-checked linear model.
#[derive(Debug, Clone)]
pub struct LinearModel {
    activation: Activation,
    labels: Vec<String>,
    biases: Vec<f64>,
    /// Dense `labels × features` weight rows
    weights: Vec<Vec<f64>>,
    feature_count: usize,
}

impl LinearModel {
    /// Load `model.json` from `dir`, verifying the manifest first.
    ///
    /// # Errors
    /// Returns `ModelError` on integrity failure, bad format, or a feature
    /// list that does not match `catalog`.
    pub fn load(dir: &Path, catalog: &SymptomCatalog, require_manifest: bool) -> Result<Self, ModelError> {
        verify_manifest(dir, MODEL_FILE, require_manifest)?;

        let path = dir.join(MODEL_FILE);
        let content = fs::read_to_string(&path).map_err(|e| ModelError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let model = Self::from_json(&content, catalog)?;

        tracing::info!(
            "Loaded model: {} labels over {} features ({:?})",
            model.labels.len(),
            model.feature_count,
            model.activation
        );
        Ok(model)
    }

    /// Parse a model document and check it against the catalog.
    ///
    /// # Errors
    /// See [`LinearModel::from_exported`].
    pub fn from_json(json: &str, catalog: &SymptomCatalog) -> Result<Self, ModelError> {
        let exported: ExportedModel =
            serde_json::from_str(json).map_err(|e| ModelError::Format(e.to_string()))?;
        Self::from_exported(exported, catalog)
    }

    /// Validate exported parameters and densify the weights.
    ///
    /// # Errors
    /// Returns `ModelError` if the version is unsupported, the feature list
    /// differs from the catalog, a weight names an unknown feature, labels are
    /// missing or duplicated, or a parameter is not finite.
    pub fn from_exported(exported: ExportedModel, catalog: &SymptomCatalog) -> Result<Self, ModelError> {
        if exported.version != MODEL_VERSION {
            return Err(ModelError::UnsupportedVersion(exported.version));
        }

        if exported.features.len() != catalog.len() {
            return Err(ModelError::FeatureMismatch(format!(
                "model has {} features, catalog has {}",
                exported.features.len(),
                catalog.len()
            )));
        }
        for (index, (feature, symptom)) in exported
            .features
            .iter()
            .zip(catalog.symptoms())
            .enumerate()
        {
            if normalize_identifier(feature) != symptom.id {
                return Err(ModelError::FeatureMismatch(format!(
                    "position {index}: model has '{feature}', catalog has '{}'",
                    symptom.id
                )));
            }
        }

        if exported.labels.is_empty() {
            return Err(ModelError::NoLabels);
        }

        let mut seen = HashSet::new();
        let mut labels = Vec::with_capacity(exported.labels.len());
        let mut biases = Vec::with_capacity(exported.labels.len());
        let mut weights = Vec::with_capacity(exported.labels.len());

        for entry in exported.labels {
            let label = entry.label.trim().to_string();
            if !seen.insert(label.clone()) {
                return Err(ModelError::DuplicateLabel(label));
            }
            if !entry.bias.is_finite() {
                return Err(ModelError::NonFinite(label));
            }

            let mut row = vec![0.0; catalog.len()];
            for (feature, weight) in &entry.weights {
                let Some(index) = catalog.index_of(&normalize_identifier(feature)) else {
                    return Err(ModelError::UnknownFeature {
                        label,
                        feature: feature.clone(),
                    });
                };
                if !weight.is_finite() {
                    return Err(ModelError::NonFinite(label));
                }
                row[index] = *weight;
            }

            labels.push(label);
            biases.push(entry.bias);
            weights.push(row);
        }

        Ok(Self {
            activation: exported.activation,
            labels,
            biases,
            weights,
            feature_count: catalog.len(),
        })
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    fn logits(&self, features: &FeatureVector) -> Vec<f64> {
        let active = features.active_indices();
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| bias + active.iter().map(|&i| row[i]).sum::<f64>())
            .collect()
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LinearModel {
    fn score(&self, features: &FeatureVector) -> Result<Vec<LabelScore>, ClassifierError> {
        if features.len() != self.feature_count {
            return Err(ClassifierError::FeatureLength {
                expected: self.feature_count,
                actual: features.len(),
            });
        }

        let logits = self.logits(features);
        let probabilities = match self.activation {
            Activation::Softmax => softmax(&logits),
            Activation::Sigmoid => logits.into_iter().map(sigmoid).collect(),
        };

        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::Inference(
                "activation produced a non-finite score".into(),
            ));
        }

        Ok(self
            .labels
            .iter()
            .zip(probabilities)
            .map(|(label, p)| LabelScore::new(label.clone(), p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn catalog() -> SymptomCatalog {
        SymptomCatalog::from_identifiers(["itching", "skin_rash", "cough"]).expect("Should build")
    }

    const MODEL: &str = r#"{
        "version": 1,
        "activation": "softmax",
        "features": ["itching", "skin_rash", "cough"],
        "labels": [
            { "label": "Fungal infection", "bias": 0.0, "weights": { "itching": 2.0, "skin_rash": 2.0 } },
            { "label": "Common Cold", "bias": 0.0, "weights": { "cough": 3.0 } }
        ]
    }"#;

    #[test]
    fn test_softmax_scores_in_label_order() {
        let catalog = catalog();
        let model = LinearModel::from_json(MODEL, &catalog).expect("Should load");
        let features = FeatureVector::encode(&["itching", "skin_rash"], &catalog);

        let scores = model.score(&features).expect("Should score");
        assert_eq!(scores[0].label, "Fungal infection");
        assert_eq!(scores[1].label, "Common Cold");
        let total: f64 = scores.iter().map(|s| s.confidence).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(scores[0].confidence > scores[1].confidence);
    }

    #[test]
    fn test_sigmoid_scores_are_independent() {
        let catalog = catalog();
        let json = MODEL.replace("softmax", "sigmoid");
        let model = LinearModel::from_json(&json, &catalog).expect("Should load");
        let scores = model
            .score(&FeatureVector::encode::<&str>(&[], &catalog))
            .expect("Should score");
        assert!(scores.iter().all(|s| (s.confidence - 0.5).abs() < 1e-9));
    }

    #[test]
    fn test_feature_order_must_match_catalog() {
        let reordered = SymptomCatalog::from_identifiers(["skin_rash", "itching", "cough"])
            .expect("Should build");
        assert!(matches!(
            LinearModel::from_json(MODEL, &reordered),
            Err(ModelError::FeatureMismatch(_))
        ));
    }

    #[test]
    fn test_unknown_weight_feature_rejected() {
        let catalog = catalog();
        let json = MODEL.replace("\"cough\": 3.0", "\"sneezing\": 3.0");
        assert!(matches!(
            LinearModel::from_json(&json, &catalog),
            Err(ModelError::UnknownFeature { .. })
        ));
    }

    #[test]
    fn test_wrong_vector_length() {
        let catalog = catalog();
        let model = LinearModel::from_json(MODEL, &catalog).expect("Should load");
        let err = model
            .score(&FeatureVector::from_bits(vec![1, 0]))
            .unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::FeatureLength {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_load_from_directory_without_manifest() {
        let catalog = catalog();
        let dir = tempdir().expect("Should create temp dir");
        fs::write(dir.path().join(MODEL_FILE), MODEL).expect("Should write");

        assert!(LinearModel::load(dir.path(), &catalog, false).is_ok());
        assert!(matches!(
            LinearModel::load(dir.path(), &catalog, true),
            Err(ModelError::ManifestMissing)
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let catalog = catalog();
        let json = MODEL.replace("\"version\": 1", "\"version\": 2");
        assert!(matches!(
            LinearModel::from_json(&json, &catalog),
            Err(ModelError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_bundled_assets_score_cardiac_symptoms() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let catalog = crate::adapters::load_catalog(&assets.join("symptoms.json"))
            .expect("Should load bundled catalog");
        let model = LinearModel::load(&assets, &catalog, false).expect("Should load bundled model");

        let features =
            FeatureVector::encode(&["chest_pain", "sweating", "breathlessness"], &catalog);
        let scores = model.score(&features).expect("Should score");
        let best = scores
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .expect("Should have scores");
        assert_eq!(best.label, "Heart attack");
        assert!(best.confidence > 0.45);
    }

    #[test]
    fn test_raw_feature_names_are_normalized_like_the_catalog() {
        let raw = ["itching", "spotting_ urination", "dischromic _patches"];
        let catalog = SymptomCatalog::from_identifiers(raw).expect("Should build");
        let json = r#"{
            "version": 1,
            "activation": "softmax",
            "features": ["itching", "spotting_ urination", "dischromic _patches"],
            "labels": [
                { "label": "Urinary tract infection", "weights": { "spotting_ urination": 3.0 } },
                { "label": "Psoriasis", "weights": { "dischromic _patches": 3.0 } }
            ]
        }"#;

        let model = LinearModel::from_json(json, &catalog).expect("Should load");
        let scores = model
            .score(&FeatureVector::encode(&["spotting_urination"], &catalog))
            .expect("Should score");
        assert_eq!(scores[0].label, "Urinary tract infection");
        assert!(scores[0].confidence > scores[1].confidence);
    }
}
