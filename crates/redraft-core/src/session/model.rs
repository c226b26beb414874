//! Chat session domain model.

use serde::{Deserialize, Serialize};

use super::message::Message;
use super::suggestion::EditSuggestion;

/// Suggestion state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No suggestion awaiting disposition; a new one may be proposed.
    Idle,
    /// Exactly one suggestion awaits acceptance or rejection.
    Pending,
}

/// One editing conversation about one document.
///
/// Holds the ordered message log; edit suggestions live on the model messages
/// that proposed them. At most one suggestion in the log is `Proposed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// The document this conversation edits
    pub document_id: String,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format)
    pub updated_at: String,
    /// Set once the session is closed; a closed session accepts no operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ChatSession {
    pub fn new(document_id: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            created_at: now.clone(),
            updated_at: now,
            closed_at: None,
            messages: Vec::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    pub fn close(&mut self) {
        let now = chrono::Utc::now().to_rfc3339();
        self.closed_at = Some(now.clone());
        self.updated_at = now;
    }

    pub fn state(&self) -> SessionState {
        if self.pending_suggestion().is_some() {
            SessionState::Pending
        } else {
            SessionState::Idle
        }
    }

    /// The suggestion currently awaiting disposition, if any.
    pub fn pending_suggestion(&self) -> Option<&EditSuggestion> {
        self.messages
            .iter()
            .rev()
            .filter_map(|m| m.edit_suggestion.as_ref())
            .find(|s| s.is_pending())
    }

    pub fn find_suggestion(&self, suggestion_id: &str) -> Option<&EditSuggestion> {
        self.messages
            .iter()
            .filter_map(|m| m.edit_suggestion.as_ref())
            .find(|s| s.id == suggestion_id)
    }

    /// The message that proposed the given suggestion.
    pub fn suggestion_message_mut(&mut self, suggestion_id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| {
            m.edit_suggestion
                .as_ref()
                .is_some_and(|s| s.id == suggestion_id)
        })
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
