//! Consultation service: Hosts conversation sessions by id.
//!
//! Each session owns its own `ConversationState`; the store is the only
//! shared structure and is only touched to load and save whole states.

use std::sync::Arc;

use crate::domain::{uuid_v4, Action, ConversationState, Effect, StepInput, SymptomCatalog};
use crate::ports::SessionStore;
use crate::MedichatError;

use super::conversation::ConversationEngine;
use super::diagnosis::Analyzer;

/// Outcome of one interaction with a session.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
}

/// Service for running many independent consultations.
pub struct ConsultationService<A, S>
where
    A: Analyzer,
    S: SessionStore,
{
    engine: Arc<ConversationEngine<A>>,
    sessions: Arc<S>,
}

impl<A, S> Clone for ConsultationService<A, S>
where
    A: Analyzer,
    S: SessionStore,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<A, S> ConsultationService<A, S>
where
    A: Analyzer,
    S: SessionStore,
{
    pub fn new(engine: Arc<ConversationEngine<A>>, sessions: Arc<S>) -> Self {
        Self { engine, sessions }
    }

    /// Symptom vocabulary offered at the symptom step.
    #[must_use]
    pub fn catalog(&self) -> &SymptomCatalog {
        self.engine.analyzer().catalog()
    }

    /// Open a session for an authenticated user and emit its first prompts.
    ///
    /// # Errors
    /// Returns error if the session store fails.
    pub fn open(&self, user: &str) -> Result<(String, Interaction), MedichatError> {
        let session_id = uuid_v4();
        let (state, effects) = self
            .engine
            .transition(ConversationState::new(user), Action::Refresh);
        self.store(&session_id, state.clone())?;

        tracing::info!("Opened consultation {}", session_id);
        Ok((session_id, Interaction { state, effects }))
    }

    /// Re-evaluate a session without input.
    ///
    /// # Errors
    /// Returns error if the session is unknown or the store fails.
    pub fn refresh(&self, session_id: &str) -> Result<Interaction, MedichatError> {
        self.apply(session_id, Action::Refresh)
    }

    /// Submit the current step's answers.
    ///
    /// Validation failures are not errors: they come back as
    /// `Effect::Rejected` with the state unchanged.
    ///
    /// # Errors
    /// Returns error if the session is unknown or the store fails.
    pub fn submit(&self, session_id: &str, input: StepInput) -> Result<Interaction, MedichatError> {
        self.apply(session_id, Action::Submit(input))
    }

    /// Start a new consultation in a completed session.
    ///
    /// The fresh session is re-evaluated straight away so its greeting is
    /// ready to render.
    ///
    /// # Errors
    /// Returns error if the session is unknown or the store fails.
    pub fn reset(&self, session_id: &str) -> Result<Interaction, MedichatError> {
        let mut interaction = self.apply(session_id, Action::Reset)?;
        if interaction.effects.contains(&Effect::Reset) {
            tracing::info!("Reset consultation {}", session_id);
            let refreshed = self.apply(session_id, Action::Refresh)?;
            interaction.effects.extend(refreshed.effects);
            interaction.state = refreshed.state;
        }
        Ok(interaction)
    }

    /// Current state of a session.
    ///
    /// # Errors
    /// Returns error if the session is unknown or the store fails.
    pub fn snapshot(&self, session_id: &str) -> Result<ConversationState, MedichatError> {
        self.sessions
            .load(session_id)
            .map_err(|e| MedichatError::SessionStore(e.to_string()))?
            .ok_or_else(|| MedichatError::SessionNotFound(session_id.to_string()))
    }

    /// Drop a session and everything it collected.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub fn close(&self, session_id: &str) -> Result<(), MedichatError> {
        self.sessions
            .remove(session_id)
            .map_err(|e| MedichatError::SessionStore(e.to_string()))?;
        tracing::info!("Closed consultation {}", session_id);
        Ok(())
    }

    /// Number of open sessions.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub fn open_sessions(&self) -> Result<usize, MedichatError> {
        self.sessions
            .count()
            .map_err(|e| MedichatError::SessionStore(e.to_string()))
    }

    fn apply(&self, session_id: &str, action: Action) -> Result<Interaction, MedichatError> {
        let current = self.snapshot(session_id)?;
        let (state, effects) = self.engine.transition(current, action);
        self.store(session_id, state.clone())?;
        Ok(Interaction { state, effects })
    }

    fn store(&self, session_id: &str, state: ConversationState) -> Result<(), MedichatError> {
        self.sessions
            .save(session_id, state)
            .map_err(|e| MedichatError::SessionStore(e.to_string()))
    }
}
