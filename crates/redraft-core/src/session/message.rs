//! Conversation message types.

use serde::{Deserialize, Serialize};

use super::suggestion::EditSuggestion;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message from the human editor.
    User,
    /// Message from the text-generation model (or the engine on its behalf).
    Model,
}

/// A single message in an editing conversation.
///
/// Messages are appended and never reordered or deleted. The only fields that
/// change after creation are the two disposition flags of a message carrying
/// an edit suggestion (and that suggestion's status).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    #[serde(default)]
    pub suggestion_applied: bool,
    #[serde(default)]
    pub suggestion_rejected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_suggestion: Option<EditSuggestion>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            suggestion_applied: false,
            suggestion_rejected: false,
            edit_suggestion: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Model, content)
    }

    pub fn with_suggestion(mut self, suggestion: EditSuggestion) -> Self {
        self.edit_suggestion = Some(suggestion);
        self
    }
}
