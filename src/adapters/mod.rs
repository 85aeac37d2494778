//! Adapters layer: Concrete implementations of ports.
//!
//! - `assets`: symptom catalog JSON and the disease reference CSVs
//! - `model`: JSON linear classifier with SHA-256 manifest check
//! - `deadline`: timeout wrapper for any classifier
//! - `memory`: in-process session store
//! - `sanitize`: redaction for log output

pub mod assets;
pub mod deadline;
pub mod memory;
pub mod model;
pub mod sanitize;

pub use assets::{load_catalog, AssetError, ConditionBook};
pub use deadline::DeadlineClassifier;
pub use memory::{MemorySessionStore, SessionStoreError};
pub use model::{LinearModel, ModelError};
