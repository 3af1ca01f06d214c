use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::domain::{Conversation, DomainError, Message, MessageRole};

/// Conversation state keyed by session id. In-memory only: history is
/// session-scoped and intentionally does not survive a restart.
pub struct SessionService {
    sessions: RwLock<HashMap<Uuid, Conversation>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn create(&self) -> Result<Uuid, DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let id = Uuid::new_v4();
        sessions.insert(id, Conversation::with_id(id));
        Ok(id)
    }

    /// Unknown sessions have empty history; the first append creates them.
    pub fn history(&self, id: Uuid) -> Result<Vec<Message>, DomainError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(sessions
            .get(&id)
            .map(|c| c.messages.clone())
            .unwrap_or_default())
    }

    pub fn append(
        &self,
        id: Uuid,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<(), DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        sessions
            .entry(id)
            .or_insert_with(|| Conversation::with_id(id))
            .add_message(role, content);
        Ok(())
    }

    /// Clears a session's history. Returns whether the session existed.
    pub fn clear(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        match sessions.get_mut(&id) {
            Some(conversation) => {
                conversation.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_accumulate_in_order() {
        let sessions = SessionService::new();
        let id = sessions.create().unwrap();

        sessions.append(id, MessageRole::User, "question").unwrap();
        sessions.append(id, MessageRole::Assistant, "answer").unwrap();

        let history = sessions.history(id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[test]
    fn clear_empties_history_but_keeps_the_session() {
        let sessions = SessionService::new();
        let id = sessions.create().unwrap();
        sessions.append(id, MessageRole::User, "question").unwrap();

        assert!(sessions.clear(id).unwrap());
        assert!(sessions.history(id).unwrap().is_empty());
        assert!(!sessions.clear(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn unknown_session_has_empty_history() {
        let sessions = SessionService::new();
        assert!(sessions.history(Uuid::new_v4()).unwrap().is_empty());
    }
}
