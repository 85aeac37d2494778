//! In-memory session store.
//!
//! Sessions live only as long as the process. Nothing is written to disk.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::ConversationState;
use crate::ports::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store lock poisoned")]
    Poisoned,
}

/// Session states keyed by session id.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, ConversationState>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    type Error = SessionStoreError;

    fn load(&self, session_id: &str) -> Result<Option<ConversationState>, Self::Error> {
        let sessions = self.sessions.lock().map_err(|_| SessionStoreError::Poisoned)?;
        Ok(sessions.get(session_id).cloned())
    }

    fn save(&self, session_id: &str, state: ConversationState) -> Result<(), Self::Error> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionStoreError::Poisoned)?;
        sessions.insert(session_id.to_string(), state);
        Ok(())
    }

    fn remove(&self, session_id: &str) -> Result<(), Self::Error> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionStoreError::Poisoned)?;
        sessions.remove(session_id);
        Ok(())
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let sessions = self.sessions.lock().map_err(|_| SessionStoreError::Poisoned)?;
        Ok(sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_isolated() {
        let store = MemorySessionStore::new();
        store
            .save("a", ConversationState::new("alice"))
            .expect("Should save");
        store
            .save("b", ConversationState::new("bob"))
            .expect("Should save");

        let a = store.load("a").expect("Should load").expect("Should exist");
        assert_eq!(a.user, "alice");
        assert_eq!(store.count().expect("Should count"), 2);

        store.remove("a").expect("Should remove");
        assert!(store.load("a").expect("Should load").is_none());
        assert_eq!(store.count().expect("Should count"), 1);
    }
}
