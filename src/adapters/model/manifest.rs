//! SHA-256 manifest binding the model assets.
//!
//! `manifest.json` records a digest for each asset file. When present, every
//! listed file must hash to its recorded digest before the model is used.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ModelError;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub version: u32,
    pub files: BTreeMap<String, String>,
}

impl AssetManifest {
    /// Hash the named files under `dir`.
    ///
    /// # Errors
    /// Returns `ModelError::Read` if a file cannot be read.
    pub fn build(dir: &Path, names: &[&str]) -> Result<Self, ModelError> {
        let mut files = BTreeMap::new();
        for name in names {
            let path = dir.join(name);
            let bytes = fs::read(&path).map_err(|e| ModelError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            files.insert((*name).to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            files,
        })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Check `manifest.json` in `dir` against the files it lists.
///
/// # Returns
/// `true` if a manifest was found and verified, `false` if there is none and
/// one is not required.
///
/// # Errors
/// Returns `ModelError` when the manifest is required but absent, malformed,
/// does not bind `model_file`, or any digest differs.
pub fn verify_manifest(dir: &Path, model_file: &str, require: bool) -> Result<bool, ModelError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        if require {
            return Err(ModelError::ManifestMissing);
        }
        tracing::warn!("No {} next to the model; skipping integrity check", MANIFEST_FILE);
        return Ok(false);
    }

    let content = fs::read(&path).map_err(|e| ModelError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let manifest: AssetManifest = serde_json::from_slice(&content)
        .map_err(|e| ModelError::Manifest(format!("invalid {MANIFEST_FILE}: {e}")))?;

    if manifest.version != MANIFEST_VERSION {
        return Err(ModelError::Manifest(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }
    if !manifest.files.contains_key(model_file) {
        return Err(ModelError::Manifest(format!(
            "manifest does not include {model_file}"
        )));
    }

    for (rel, expected) in &manifest.files {
        if rel.contains("..") || Path::new(rel).is_absolute() {
            return Err(ModelError::Manifest(format!("refusing path {rel}")));
        }
        let file = dir.join(rel);
        let bytes = fs::read(&file).map_err(|e| ModelError::Read {
            path: file.display().to_string(),
            reason: e.to_string(),
        })?;
        if !constant_time_eq_str(&sha256_hex(&bytes), &expected.to_ascii_lowercase()) {
            return Err(ModelError::HashMismatch(rel.clone()));
        }
    }

    tracing::info!("Verified {} asset digests", manifest.files.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_then_verify() {
        let dir = tempdir().expect("Should create temp dir");
        fs::write(dir.path().join("model.json"), b"{}").expect("Should write");
        let manifest = AssetManifest::build(dir.path(), &["model.json"]).expect("Should hash");
        fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).expect("Should serialize"),
        )
        .expect("Should write");

        assert!(verify_manifest(dir.path(), "model.json", true).expect("Should verify"));
    }

    #[test]
    fn test_tampered_file_fails() {
        let dir = tempdir().expect("Should create temp dir");
        fs::write(dir.path().join("model.json"), b"{}").expect("Should write");
        let manifest = AssetManifest::build(dir.path(), &["model.json"]).expect("Should hash");
        fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).expect("Should serialize"),
        )
        .expect("Should write");
        fs::write(dir.path().join("model.json"), b"{ }").expect("Should write");

        assert!(matches!(
            verify_manifest(dir.path(), "model.json", false),
            Err(ModelError::HashMismatch(_))
        ));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempdir().expect("Should create temp dir");
        assert!(!verify_manifest(dir.path(), "model.json", false).expect("Should pass"));
        assert!(matches!(
            verify_manifest(dir.path(), "model.json", true),
            Err(ModelError::ManifestMissing)
        ));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
