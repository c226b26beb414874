//! Text-generation collaborator interface.
//!
//! The engine never builds prompts itself; it hands the current document
//! text, the user's instruction and the prior conversation to a
//! [`TextGenerator`] and gets back a reply that may carry an edit suggestion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{Message, SuggestionDraft};

/// Input for one generation round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub document_text: String,
    pub instruction: String,
    /// Conversation before the instruction, oldest first.
    #[serde(default)]
    pub history: Vec<Message>,
}

impl GenerationRequest {
    pub fn new(document_text: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            document_text: document_text.into(),
            instruction: instruction.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }
}

/// What the collaborator answered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationReply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_suggestion: Option<SuggestionDraft>,
}

impl GenerationReply {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            edit_suggestion: None,
        }
    }

    pub fn with_suggestion(
        message: impl Into<String>,
        new_value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            edit_suggestion: Some(SuggestionDraft::new(new_value, reason)),
        }
    }
}

/// The text-generation collaborator.
///
/// Implementations report collaborator failures as `RedraftError::Upstream`.
/// The caller enforces the round-trip timeout, so implementations need not.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply>;
}
