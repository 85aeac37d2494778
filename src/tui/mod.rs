//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides the consultation chat:
//! - Transcript of prompts, answers and the diagnosis
//! - Per-step input form
//! - Background analysis so the screen stays live while the model scores

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, LocalAnalyzer, LocalConsultations};
pub use styles::MedicalTheme;
pub use worker::{AnalysisProgress, AnalysisWorker, AnalysisWorkerHandle};
