//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the interview, the analysis and session hosting.

mod consultation;
mod conversation;
mod diagnosis;

pub use consultation::{ConsultationService, Interaction};
pub use conversation::ConversationEngine;
pub use diagnosis::{AnalysisInput, Analyzer, DiagnosisService};
