//! Session store port: Per-session conversation state keyed by session id.

use crate::domain::ConversationState;

/// Trait for holding conversation states between interactions.
///
/// Each session owns its state; stores never share state between ids.
pub trait SessionStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a copy of a session's state.
    ///
    /// # Returns
    /// `None` if the session does not exist.
    ///
    /// # Errors
    /// Returns error if the store is unusable.
    fn load(&self, session_id: &str) -> Result<Option<ConversationState>, Self::Error>;

    /// Insert or replace a session's state.
    ///
    /// # Errors
    /// Returns error if the store is unusable.
    fn save(&self, session_id: &str, state: ConversationState) -> Result<(), Self::Error>;

    /// Drop a session.
    ///
    /// # Errors
    /// Returns error if the store is unusable.
    fn remove(&self, session_id: &str) -> Result<(), Self::Error>;

    /// Number of live sessions.
    ///
    /// # Errors
    /// Returns error if the store is unusable.
    fn count(&self) -> Result<usize, Self::Error>;
}
