//! Ports layer: Trait definitions for external operations.
//!
//! These traits define the boundaries between the application and the
//! outside world (the trained model, reference tables, session hosting).

mod classifier;
mod knowledge;
mod sessions;

pub use classifier::{Classifier, ClassifierError};
pub use knowledge::ConditionKnowledge;
pub use sessions::SessionStore;
