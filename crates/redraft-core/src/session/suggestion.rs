//! Edit suggestion types.

use serde::{Deserialize, Serialize};

use crate::error::{RedraftError, Result};

/// Disposition of an edit suggestion. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Proposed,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SuggestionStatus::Proposed)
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionStatus::Proposed => write!(f, "proposed"),
            SuggestionStatus::Accepted => write!(f, "accepted"),
            SuggestionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A proposed replacement for a document's text, awaiting human disposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSuggestion {
    pub id: String,
    /// Document text at the time of the proposal.
    pub old_value: String,
    pub new_value: String,
    pub reason: String,
    pub status: SuggestionStatus,
    /// Timestamp of the proposal (ISO 8601 format)
    pub proposed_at: String,
    /// Timestamp of acceptance or rejection (ISO 8601 format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    /// Version written when the suggestion was accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_version: Option<u32>,
    /// Confirmation or acknowledgement message appended on resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_message_id: Option<String>,
}

impl EditSuggestion {
    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Marks the suggestion accepted. Callers check `is_pending` first.
    pub fn mark_accepted(&mut self, version_number: u32) {
        self.status = SuggestionStatus::Accepted;
        self.applied_version = Some(version_number);
        self.resolved_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Marks the suggestion rejected. Callers check `is_pending` first.
    pub fn mark_rejected(&mut self) {
        self.status = SuggestionStatus::Rejected;
        self.resolved_at = Some(chrono::Utc::now().to_rfc3339());
    }
}

/// An edit proposed by the text-generation collaborator, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuggestionDraft {
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(default)]
    pub reason: String,
}

impl SuggestionDraft {
    pub fn new(new_value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            new_value: Some(new_value.into()),
            reason: reason.into(),
        }
    }

    /// Turns the draft into a proposed suggestion against `current_text`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the new value is missing or blank
    /// - `Validation` if the new value equals the current text
    pub fn into_suggestion(self, current_text: &str) -> Result<EditSuggestion> {
        let new_value = match self.new_value {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                return Err(RedraftError::validation(
                    "edit suggestion is missing a new value",
                ));
            }
        };
        if new_value == current_text {
            return Err(RedraftError::validation(
                "edit suggestion does not change the document",
            ));
        }

        let reason = match self.reason.trim() {
            "" => "AI suggestion".to_string(),
            trimmed => trimmed.to_string(),
        };

        Ok(EditSuggestion {
            id: uuid::Uuid::new_v4().to_string(),
            old_value: current_text.to_string(),
            new_value,
            reason,
            status: SuggestionStatus::Proposed,
            proposed_at: chrono::Utc::now().to_rfc3339(),
            resolved_at: None,
            applied_version: None,
            resolution_message_id: None,
        })
    }
}
