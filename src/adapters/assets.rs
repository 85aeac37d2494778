//! Asset loaders: symptom catalog and the disease reference tables.
//!
//! Expected layout of the assets directory:
//!
//! ```text
//! assets/
//!   symptoms.json              ["itching", "skin_rash", ...]
//!   symptom_Description.csv    Disease,Description
//!   symptom_precaution.csv     Disease,Precaution_1,...,Precaution_n
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{CatalogError, SymptomCatalog};
use crate::ports::ConditionKnowledge;

pub const SYMPTOMS_FILE: &str = "symptoms.json";
pub const DESCRIPTIONS_FILE: &str = "symptom_Description.csv";
pub const PRECAUTIONS_FILE: &str = "symptom_precaution.csv";

/// Errors reading reference assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load `symptoms.json` into a catalog.
///
/// # Errors
/// Returns `CatalogError` if the file is missing, is not a JSON array of
/// strings, or fails catalog validation (empty, duplicates, label clash).
pub fn load_catalog(path: &Path) -> Result<SymptomCatalog, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::Missing(path.display().to_string()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CatalogError::Unreadable(format!("{}: {e}", path.display())))?;
    let identifiers: Vec<String> = serde_json::from_str(&content)
        .map_err(|e| CatalogError::Unreadable(format!("{}: {e}", path.display())))?;

    let catalog = SymptomCatalog::from_identifiers(identifiers)?;
    info!("Loaded symptom catalog with {} entries", catalog.len());
    Ok(catalog)
}

/// Title-case each alphabetic run, lowering the rest of the run.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Clean one precaution cell for display.
fn tidy_precaution(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(title_case(trimmed).replace("Asprin", "Aspirin"))
}

/// Descriptions and precautions keyed by disease label.
#[derive(Debug, Clone, Default)]
pub struct ConditionBook {
    descriptions: HashMap<String, String>,
    precautions: HashMap<String, Vec<String>>,
}

impl ConditionBook {
    /// Load both CSV tables from the assets directory.
    ///
    /// A missing table is treated as empty; lookups then use fallbacks.
    ///
    /// # Errors
    /// Returns `AssetError` if a present table cannot be read or parsed.
    pub fn load(assets_dir: &Path) -> Result<Self, AssetError> {
        let mut book = Self::default();

        let descriptions = assets_dir.join(DESCRIPTIONS_FILE);
        if descriptions.exists() {
            let file = open(&descriptions)?;
            book.read_descriptions(file)
                .map_err(|source| AssetError::Csv {
                    path: descriptions.clone(),
                    source,
                })?;
        } else {
            tracing::warn!("{} not found; descriptions will use the fallback", DESCRIPTIONS_FILE);
        }

        let precautions = assets_dir.join(PRECAUTIONS_FILE);
        if precautions.exists() {
            let file = open(&precautions)?;
            book.read_precautions(file)
                .map_err(|source| AssetError::Csv {
                    path: precautions.clone(),
                    source,
                })?;
        } else {
            tracing::warn!("{} not found; precautions will use the fallback", PRECAUTIONS_FILE);
        }

        info!(
            "Loaded reference tables: {} descriptions, {} precaution lists",
            book.descriptions.len(),
            book.precautions.len()
        );
        Ok(book)
    }

    /// Read a `Disease,Description` table (header row required).
    ///
    /// # Errors
    /// Returns the CSV error for malformed input.
    pub fn read_descriptions<R: Read>(&mut self, reader: R) -> Result<(), csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        for result in reader.records() {
            let record = result?;
            let (Some(disease), Some(description)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let disease = disease.trim();
            let description = description.trim();
            if disease.is_empty() || description.is_empty() {
                continue;
            }
            self.descriptions
                .insert(disease.to_string(), description.to_string());
        }
        Ok(())
    }

    /// Read a `Disease,Precaution_1..n` table (header row required).
    ///
    /// # Errors
    /// Returns the CSV error for malformed input.
    pub fn read_precautions<R: Read>(&mut self, reader: R) -> Result<(), csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        for result in reader.records() {
            let record = result?;
            let Some(disease) = record.get(0).map(str::trim).filter(|d| !d.is_empty()) else {
                continue;
            };
            let steps: Vec<String> = record.iter().skip(1).filter_map(tidy_precaution).collect();
            debug!("{} precautions for '{}'", steps.len(), disease);
            self.precautions.insert(disease.to_string(), steps);
        }
        Ok(())
    }
}

impl ConditionKnowledge for ConditionBook {
    fn description(&self, disease: &str) -> Option<&str> {
        self.descriptions.get(disease.trim()).map(String::as_str)
    }

    fn precautions(&self, disease: &str) -> Option<&[String]> {
        self.precautions.get(disease.trim()).map(Vec::as_slice)
    }
}

fn open(path: &Path) -> Result<fs::File, AssetError> {
    fs::File::open(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a JSON file.
///
/// # Errors
/// Returns `AssetError::Missing` if absent, otherwise read/parse errors.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    if !path.exists() {
        return Err(AssetError::Missing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| AssetError::Json {
        path: path.to_path_buf(),
        source,
    })
}
