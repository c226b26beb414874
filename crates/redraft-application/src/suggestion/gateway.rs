//! Edit application gateway.
//!
//! The single place every surface (preview modal, chat panel, CLI) goes to
//! resolve a suggestion. Calls for one suggestion are serialised on a
//! per-suggestion slot that caches the outcome, so a repeated apply returns
//! the first result instead of writing a second version.

use super::manager::{AppliedEdit, SuggestionLifecycleManager};
use redraft_core::document::Document;
use redraft_core::session::{EditSuggestion, Message, PendingState, SuggestionEvent, SuggestionStatus};
use redraft_core::{RedraftError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};

#[derive(Debug, Clone)]
enum Resolution {
    Applied(AppliedEdit),
    Rejected(Message),
}

#[derive(Debug, Clone, Copy)]
enum Intent {
    Apply,
    Reject,
}

type Slot = Arc<Mutex<Option<Resolution>>>;

pub struct EditGateway {
    manager: Arc<SuggestionLifecycleManager>,
    slots: std::sync::Mutex<HashMap<String, Slot>>,
}

impl EditGateway {
    pub fn new(manager: Arc<SuggestionLifecycleManager>) -> Self {
        Self {
            manager,
            slots: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Applies a suggestion. Idempotent.
    ///
    /// Fails with `Conflict` if the suggestion was rejected, or if the
    /// document changed since it was proposed.
    pub async fn apply(&self, suggestion_id: &str) -> Result<AppliedEdit> {
        match self.settle(suggestion_id, Intent::Apply).await? {
            Resolution::Applied(outcome) => Ok(outcome),
            Resolution::Rejected(_) => Err(RedraftError::conflict(format!(
                "Suggestion '{}' was already rejected",
                suggestion_id
            ))),
        }
    }

    /// Rejects a suggestion and returns the acknowledgement. Idempotent.
    ///
    /// Fails with `Conflict` if the suggestion was applied.
    pub async fn reject(&self, suggestion_id: &str) -> Result<Message> {
        match self.settle(suggestion_id, Intent::Reject).await? {
            Resolution::Rejected(acknowledgement) => Ok(acknowledgement),
            Resolution::Applied(outcome) => Err(RedraftError::conflict(format!(
                "Suggestion '{}' was already applied as version {}",
                suggestion_id, outcome.version.version_number
            ))),
        }
    }

    /// Closes a session and forgets the outcomes cached for its suggestions.
    pub async fn close_session(&self, session_id: &str) -> Result<()> {
        let suggestion_ids = self.manager.close_session(session_id).await?;
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| RedraftError::internal("gateway slot table poisoned"))?;
        for id in &suggestion_ids {
            slots.remove(id);
        }
        Ok(())
    }

    pub async fn pending(&self, session_id: &str) -> Result<Option<EditSuggestion>> {
        self.manager.pending_suggestion(session_id).await
    }

    /// Watches the pending state of one session.
    pub fn subscribe(&self, session_id: &str) -> watch::Receiver<PendingState> {
        self.manager.bus().subscribe(session_id)
    }

    /// Receives every suggestion event from now on.
    pub fn events(&self) -> broadcast::Receiver<SuggestionEvent> {
        self.manager.bus().events()
    }

    async fn settle(&self, suggestion_id: &str, intent: Intent) -> Result<Resolution> {
        let slot = self.slot(suggestion_id)?;
        let mut cached = slot.lock().await;
        if let Some(resolution) = cached.as_ref() {
            tracing::debug!(
                "[EditGateway] {:?} on settled suggestion {}; returning stored outcome",
                intent,
                suggestion_id
            );
            return Ok(resolution.clone());
        }

        let session_id = self.manager.session_for_suggestion(suggestion_id).await?;
        let attempt = match intent {
            Intent::Apply => self
                .manager
                .accept_suggestion(&session_id, suggestion_id)
                .await
                .map(Resolution::Applied),
            Intent::Reject => self
                .manager
                .reject_suggestion(&session_id, suggestion_id)
                .await
                .map(Resolution::Rejected),
        };

        let resolution = match attempt {
            Ok(resolution) => resolution,
            // Settled through the manager directly; rebuild the outcome.
            Err(e) if e.is_conflict() => self
                .recover(&session_id, suggestion_id)
                .await?
                .ok_or(e)?,
            Err(e) => return Err(e),
        };

        *cached = Some(resolution.clone());
        Ok(resolution)
    }

    /// Reconstructs the outcome of a suggestion settled outside the gateway.
    async fn recover(&self, session_id: &str, suggestion_id: &str) -> Result<Option<Resolution>> {
        let session = self.manager.get_session(session_id).await?;
        let Some(suggestion) = session.find_suggestion(suggestion_id) else {
            return Ok(None);
        };

        match suggestion.status {
            SuggestionStatus::Proposed => Ok(None),
            SuggestionStatus::Accepted => {
                let Some(version_number) = suggestion.applied_version else {
                    return Ok(None);
                };
                let store = self.manager.versions();
                let version = store
                    .get_version(&session.document_id, version_number)
                    .await?;
                // Later versions may exist; report the document as the accept left it.
                let current = store.get_document(&session.document_id).await?;
                let document = Document {
                    current_text: version.content.clone(),
                    current_version_number: version.version_number,
                    updated_at: version.created_at.clone(),
                    ..current
                };
                Ok(Some(Resolution::Applied(AppliedEdit { document, version })))
            }
            SuggestionStatus::Rejected => {
                let acknowledgement = suggestion.resolution_message_id.as_ref().and_then(|id| {
                    session.messages.iter().find(|m| &m.id == id).cloned()
                });
                Ok(acknowledgement.map(Resolution::Rejected))
            }
        }
    }

    fn slot(&self, suggestion_id: &str) -> Result<Slot> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| RedraftError::internal("gateway slot table poisoned"))?;
        Ok(slots
            .entry(suggestion_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone())
    }
}
