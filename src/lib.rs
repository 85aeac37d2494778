//! # Medichat
//!
//! Guided symptom interview with rule-based triage.
//!
//! This crate provides:
//! - A step-by-step intake conversation (demographics, vitals, lifestyle,
//!   symptoms, duration) driven by a pure transition function
//! - Disease ranking from a binary symptom vector via a pluggable classifier
//! - A deterministic triage decision list producing an advisory urgency tier
//! - Terminal UI for local use
//!
//! The output is advisory only and is not professional medical advice.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (catalog, profile, ranking, triage, conversation state)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (asset files, JSON model, session store)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment and policy-file configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{ConversationState, DiagnosisReport, Step, UrgencyTier};

/// Result type for Medichat operations
pub type Result<T> = std::result::Result<T, MedichatError>;

/// Main error type for Medichat
#[derive(Debug, thiserror::Error)]
pub enum MedichatError {
    #[error("Symptom catalog unavailable: {0}")]
    CatalogUnavailable(#[from] domain::CatalogError),

    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(#[from] ports::ClassifierError),

    #[error("Invalid input: {0}")]
    InvalidStepInput(#[from] domain::StepError),

    #[error("Model error: {0}")]
    Model(#[from] adapters::ModelError),

    #[error("Asset error: {0}")]
    Asset(#[from] adapters::AssetError),

    #[error("Unknown session")]
    SessionNotFound(String),

    #[error("Session store failed: {0}")]
    SessionStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
