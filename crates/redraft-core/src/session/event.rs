//! Suggestion events.
//!
//! Published whenever a session's pending suggestion changes.

use serde::{Deserialize, Serialize};

use super::suggestion::EditSuggestion;

/// Change to the shared pending-suggestion state of a session.
///
/// Published to every surface (chat panel, preview modal) observing the
/// session, so that an accept or reject from one is reflected in all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestionEvent {
    /// A new suggestion awaits disposition.
    Proposed {
        session_id: String,
        suggestion: EditSuggestion,
    },
    /// The suggestion was accepted and written as a new version.
    Applied {
        session_id: String,
        suggestion_id: String,
        version_number: u32,
    },
    /// The suggestion was rejected; the document is unchanged.
    Rejected {
        session_id: String,
        suggestion_id: String,
    },
    /// The session was closed; any surface showing it should reset.
    Cleared { session_id: String },
}

impl SuggestionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            SuggestionEvent::Proposed { session_id, .. }
            | SuggestionEvent::Applied { session_id, .. }
            | SuggestionEvent::Rejected { session_id, .. }
            | SuggestionEvent::Cleared { session_id } => session_id,
        }
    }
}

/// Latest pending-suggestion state of one session, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PendingState {
    /// Nothing has been proposed yet.
    #[default]
    Idle,
    Pending {
        suggestion: EditSuggestion,
    },
    Applied {
        suggestion_id: String,
        version_number: u32,
    },
    Rejected {
        suggestion_id: String,
    },
    Cleared,
}

impl PendingState {
    /// The suggestion awaiting disposition, if any.
    pub fn pending(&self) -> Option<&EditSuggestion> {
        match self {
            PendingState::Pending { suggestion } => Some(suggestion),
            _ => None,
        }
    }
}

impl From<&SuggestionEvent> for PendingState {
    fn from(event: &SuggestionEvent) -> Self {
        match event {
            SuggestionEvent::Proposed { suggestion, .. } => PendingState::Pending {
                suggestion: suggestion.clone(),
            },
            SuggestionEvent::Applied {
                suggestion_id,
                version_number,
                ..
            } => PendingState::Applied {
                suggestion_id: suggestion_id.clone(),
                version_number: *version_number,
            },
            SuggestionEvent::Rejected { suggestion_id, .. } => PendingState::Rejected {
                suggestion_id: suggestion_id.clone(),
            },
            SuggestionEvent::Cleared { .. } => PendingState::Cleared,
        }
    }
}
