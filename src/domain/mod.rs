//! Domain layer: Core types and rules.
//!
//! Pure Rust types with no I/O. Everything here is deterministic and
//! serializable.

mod conversation;
mod diagnosis;
mod features;
mod patient;
mod prediction;
mod symptom;
mod triage;

pub use conversation::{
    Action, ContentKind, ConversationState, Effect, Role, Step, StepError, StepInput, Turn,
    TurnContent,
};
pub use diagnosis::{uuid_v4, DiagnosisReport, FALLBACK_DESCRIPTION, FALLBACK_PRECAUTION};
pub use features::FeatureVector;
pub use patient::{
    parse_risk_factors, Gender, PatientProfile, ProfileDraft, RiskFactor, SleepBand,
    SymptomSelection, AGE_RANGE, DURATION_DAYS_RANGE, HEIGHT_CM_RANGE, WEIGHT_KG_RANGE,
};
pub(crate) use patient::check_range;
pub use prediction::{LabelScore, PredictionRanking, RankedLabel, RankingConfig};
pub use symptom::{display_label, normalize_identifier, CatalogError, Symptom, SymptomCatalog};
pub use triage::{
    Rationale, TriageConfig, TriageDecision, TriagePolicy, TriageResult, UrgencyTier,
    DEFAULT_CRITICAL_DISEASES,
};
