//! Suggestion lifecycle manager.
//!
//! Owns the live chat sessions and drives each one through
//! `Idle → Pending → {Applied | Rejected} → Idle`. Every mutation follows the
//! same shape: lock the session, work on a clone, persist it, then commit the
//! clone to memory and publish the event. A failed save leaves memory as it
//! was.

use crate::event_bus::SuggestionBus;
use crate::version_store::VersionStore;
use redraft_core::config::EngineConfig;
use redraft_core::diff::{DiffSegment, DiffSummary, diff_with_window};
use redraft_core::document::{Document, EditedBy, NewVersion, Version};
use redraft_core::generation::{GenerationRequest, TextGenerator};
use redraft_core::session::{
    ChatSession, EditSuggestion, Message, PendingState, SessionRepository, SuggestionDraft,
    SuggestionEvent,
};
use redraft_core::{RedraftError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

const REJECT_ACKNOWLEDGEMENT: &str = "Discarded the suggested edit. The document is unchanged.";

/// Result of accepting a suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEdit {
    /// The document as it read right after the accepted version was written.
    pub document: Document,
    pub version: Version,
}

/// A pending suggestion rendered against the document's current text.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionPreview {
    pub suggestion: EditSuggestion,
    pub current_text: String,
    pub segments: Vec<DiffSegment>,
    pub summary: DiffSummary,
}

pub struct SuggestionLifecycleManager {
    sessions: Arc<dyn SessionRepository>,
    versions: Arc<VersionStore>,
    generator: Arc<dyn TextGenerator>,
    bus: Arc<SuggestionBus>,
    config: EngineConfig,
    /// Open sessions loaded in this process.
    live: RwLock<HashMap<String, Arc<Mutex<ChatSession>>>>,
    /// IDs of sessions closed in this process, so a racing reload of a stale
    /// stored copy cannot bring one back.
    closed: std::sync::RwLock<HashSet<String>>,
    /// suggestion ID → session ID, for open sessions only
    suggestion_index: std::sync::RwLock<HashMap<String, String>>,
}

impl SuggestionLifecycleManager {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        versions: Arc<VersionStore>,
        generator: Arc<dyn TextGenerator>,
        bus: Arc<SuggestionBus>,
        config: EngineConfig,
    ) -> Self {
        Self {
            sessions,
            versions,
            generator,
            bus,
            config,
            live: RwLock::new(HashMap::new()),
            closed: std::sync::RwLock::new(HashSet::new()),
            suggestion_index: std::sync::RwLock::new(HashMap::new()),
        }
    }

    pub fn bus(&self) -> &Arc<SuggestionBus> {
        &self.bus
    }

    pub fn versions(&self) -> &Arc<VersionStore> {
        &self.versions
    }

    /// Starts a conversation about an existing document.
    pub async fn create_session(&self, document_id: &str) -> Result<ChatSession> {
        self.versions.get_document(document_id).await?;

        let session = ChatSession::new(document_id);
        self.sessions.save(&session).await?;

        self.bus.seed(&session.id, PendingState::Idle);
        self.live
            .write()
            .await
            .insert(session.id.clone(), Arc::new(Mutex::new(session.clone())));

        tracing::debug!(
            "[SuggestionLifecycleManager] Created session {} for document {}",
            session.id,
            document_id
        );
        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ChatSession> {
        let live = self.live(session_id).await?;
        let session = live.lock().await;
        ensure_open(&session)?;
        Ok(session.clone())
    }

    pub async fn pending_suggestion(&self, session_id: &str) -> Result<Option<EditSuggestion>> {
        Ok(self.get_session(session_id).await?.pending_suggestion().cloned())
    }

    /// Diffs the pending suggestion against the document as it reads now.
    pub async fn preview_suggestion(&self, session_id: &str) -> Result<Option<SuggestionPreview>> {
        let session = self.get_session(session_id).await?;
        let Some(suggestion) = session.pending_suggestion().cloned() else {
            return Ok(None);
        };

        let document = self.versions.get_document(&session.document_id).await?;
        let segments = diff_with_window(
            &document.current_text,
            &suggestion.new_value,
            self.config.diff_window,
        );
        let summary = DiffSummary::from_segments(&segments);

        Ok(Some(SuggestionPreview {
            suggestion,
            current_text: document.current_text,
            segments,
            summary,
        }))
    }

    /// Looks up which open session proposed a suggestion.
    ///
    /// Sessions not yet loaded in this process are searched in storage and
    /// loaded on a hit.
    pub async fn session_for_suggestion(&self, suggestion_id: &str) -> Result<String> {
        let indexed = self
            .suggestion_index
            .read()
            .map_err(|_| RedraftError::internal("suggestion index poisoned"))?
            .get(suggestion_id)
            .cloned();
        if let Some(session_id) = indexed {
            return Ok(session_id);
        }

        let session = self
            .sessions
            .find_by_suggestion(suggestion_id)
            .await?
            .filter(|s| !s.is_closed())
            .ok_or_else(|| RedraftError::not_found("Suggestion", suggestion_id))?;
        self.live(&session.id).await?;

        tracing::debug!(
            "[SuggestionLifecycleManager] Found suggestion {} in stored session {}",
            suggestion_id,
            session.id
        );
        Ok(session.id)
    }

    /// Records a suggestion on a new model message and makes it pending.
    ///
    /// # Errors
    ///
    /// - `Validation` if the draft has no new value or does not change the text
    /// - `Conflict` if another suggestion is pending
    /// - `NotFound` if the session does not exist or is closed
    pub async fn propose_suggestion(
        &self,
        session_id: &str,
        draft: SuggestionDraft,
    ) -> Result<EditSuggestion> {
        let live = self.live(session_id).await?;
        let mut session = live.lock().await;
        ensure_open(&session)?;

        let document = self.versions.get_document(&session.document_id).await?;
        let content = draft.reason.clone();
        let (suggestion, _) = self
            .propose_locked(&mut session, draft, content, &document.current_text)
            .await?;
        Ok(suggestion)
    }

    /// Accepts a pending suggestion and writes it as the next version.
    ///
    /// The session lock is held throughout, so a second accept racing this
    /// one sees the suggestion already accepted and fails with `Conflict`.
    pub async fn accept_suggestion(
        &self,
        session_id: &str,
        suggestion_id: &str,
    ) -> Result<AppliedEdit> {
        let live = self.live(session_id).await?;
        let mut session = live.lock().await;
        ensure_open(&session)?;

        let suggestion = resolvable(&session, suggestion_id)?.clone();

        let (document, version) = self
            .versions
            .append_version_if_unchanged(
                &session.document_id,
                &suggestion.old_value,
                NewVersion::new(
                    suggestion.new_value.clone(),
                    EditedBy::Ai,
                    suggestion.reason.clone(),
                ),
            )
            .await?;

        let confirmation = Message::model(format!(
            "Applied the suggested edit as version {}.",
            version.version_number
        ));
        let mut updated = session.clone();
        if let Some(message) = updated.suggestion_message_mut(suggestion_id) {
            message.suggestion_applied = true;
            if let Some(proposed) = message.edit_suggestion.as_mut() {
                proposed.mark_accepted(version.version_number);
                proposed.resolution_message_id = Some(confirmation.id.clone());
            }
        }
        updated.append(confirmation);

        // The version is already durable; a lost session write must not undo it.
        if let Err(e) = self.sessions.save(&updated).await {
            tracing::warn!(
                "[SuggestionLifecycleManager] Version {} written but session {} not saved: {}",
                version.version_number,
                session_id,
                e
            );
        }
        *session = updated;

        self.bus.publish(SuggestionEvent::Applied {
            session_id: session_id.to_string(),
            suggestion_id: suggestion_id.to_string(),
            version_number: version.version_number,
        });

        Ok(AppliedEdit { document, version })
    }

    /// Rejects a pending suggestion. The document is left untouched.
    ///
    /// Returns the acknowledgement message appended to the session.
    pub async fn reject_suggestion(&self, session_id: &str, suggestion_id: &str) -> Result<Message> {
        let live = self.live(session_id).await?;
        let mut session = live.lock().await;
        ensure_open(&session)?;

        resolvable(&session, suggestion_id)?;

        let acknowledgement = Message::model(REJECT_ACKNOWLEDGEMENT);
        let mut updated = session.clone();
        if let Some(message) = updated.suggestion_message_mut(suggestion_id) {
            message.suggestion_rejected = true;
            if let Some(proposed) = message.edit_suggestion.as_mut() {
                proposed.mark_rejected();
                proposed.resolution_message_id = Some(acknowledgement.id.clone());
            }
        }
        updated.append(acknowledgement.clone());

        self.sessions.save(&updated).await?;
        *session = updated;

        self.bus.publish(SuggestionEvent::Rejected {
            session_id: session_id.to_string(),
            suggestion_id: suggestion_id.to_string(),
        });
        tracing::debug!(
            "[SuggestionLifecycleManager] Rejected suggestion {} in session {}",
            suggestion_id,
            session_id
        );

        Ok(acknowledgement)
    }

    /// Sends a user instruction to the generator and records its reply.
    ///
    /// The user message is appended and saved before the generator is called.
    /// The session lock is not held while waiting, and the wait is bounded by
    /// the configured generation timeout. Returns the model message, which
    /// carries the edit suggestion if the reply proposed one.
    ///
    /// # Errors
    ///
    /// - `Validation` on blank text, or if the proposed edit is invalid
    /// - `Conflict` if the reply proposes an edit while another is pending
    /// - `UpstreamTimeout` / `Upstream` from the generator
    /// - `NotFound` if the session is unknown, or was closed before the reply arrived
    pub async fn send_message(&self, session_id: &str, text: &str) -> Result<Message> {
        if text.trim().is_empty() {
            return Err(RedraftError::validation("message must not be empty"));
        }

        let live = self.live(session_id).await?;
        // The text the generator sees is the base any suggestion it returns
        // is checked against on accept.
        let (request, base_text) = {
            let mut session = live.lock().await;
            ensure_open(&session)?;

            let document = self.versions.get_document(&session.document_id).await?;
            let base_text = document.current_text.clone();
            let request = GenerationRequest::new(document.current_text, text)
                .with_history(session.messages.clone());

            let mut updated = session.clone();
            updated.append(Message::user(text));
            self.sessions.save(&updated).await?;
            *session = updated;

            (request, base_text)
        };

        let timeout = self.config.generation_timeout();
        let reply = match tokio::time::timeout(timeout, self.generator.generate(request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::error!(
                    "[SuggestionLifecycleManager] Generation failed for session {}: {}",
                    session_id,
                    e
                );
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(
                    "[SuggestionLifecycleManager] Generation for session {} timed out after {:?}",
                    session_id,
                    timeout
                );
                return Err(RedraftError::UpstreamTimeout {
                    timeout_ms: self.config.generation_timeout_ms,
                });
            }
        };

        let mut session = live.lock().await;
        if session.is_closed() {
            tracing::warn!(
                "[SuggestionLifecycleManager] Dropping reply for closed session {}",
                session_id
            );
            return Err(RedraftError::not_found("Session", session_id));
        }

        match reply.edit_suggestion {
            Some(draft) => {
                let (_, message) = self
                    .propose_locked(&mut session, draft, reply.message, &base_text)
                    .await?;
                Ok(message)
            }
            None => {
                let message = Message::model(reply.message);
                let mut updated = session.clone();
                updated.append(message.clone());
                self.sessions.save(&updated).await?;
                *session = updated;
                Ok(message)
            }
        }
    }

    /// Closes a session and drops it from memory. Later operations on it
    /// fail with `NotFound`.
    ///
    /// Returns the IDs of the suggestions the session carried.
    pub async fn close_session(&self, session_id: &str) -> Result<Vec<String>> {
        let live = self.live(session_id).await?;
        let mut session = live.lock().await;
        ensure_open(&session)?;

        let mut updated = session.clone();
        updated.close();
        self.sessions.save(&updated).await?;
        *session = updated;

        // A request still holding the handle sees the closed flag and drops its reply.
        self.closed
            .write()
            .map_err(|_| RedraftError::internal("closed session set poisoned"))?
            .insert(session_id.to_string());
        self.live.write().await.remove(session_id);

        let suggestion_ids: Vec<String> = session
            .messages
            .iter()
            .filter_map(|m| m.edit_suggestion.as_ref())
            .map(|s| s.id.clone())
            .collect();
        if let Ok(mut index) = self.suggestion_index.write() {
            for id in &suggestion_ids {
                index.remove(id);
            }
        }

        self.bus.publish(SuggestionEvent::Cleared {
            session_id: session_id.to_string(),
        });
        tracing::debug!("[SuggestionLifecycleManager] Closed session {}", session_id);
        Ok(suggestion_ids)
    }

    /// Callers hold the session lock. `base_text` is the document text the
    /// draft was written against.
    async fn propose_locked(
        &self,
        session: &mut ChatSession,
        draft: SuggestionDraft,
        content: String,
        base_text: &str,
    ) -> Result<(EditSuggestion, Message)> {
        if let Some(pending) = session.pending_suggestion() {
            tracing::warn!(
                "[SuggestionLifecycleManager] Session {} already has pending suggestion {}",
                session.id,
                pending.id
            );
            return Err(RedraftError::conflict(format!(
                "Suggestion '{}' is still awaiting a decision",
                pending.id
            )));
        }

        let suggestion = draft.into_suggestion(base_text)?;
        let message = Message::model(content).with_suggestion(suggestion.clone());

        let mut updated = session.clone();
        updated.append(message.clone());
        self.sessions.save(&updated).await?;
        *session = updated;

        self.index_suggestion(&suggestion.id, &session.id);
        self.bus.publish(SuggestionEvent::Proposed {
            session_id: session.id.clone(),
            suggestion: suggestion.clone(),
        });
        tracing::debug!(
            "[SuggestionLifecycleManager] Proposed suggestion {} in session {}",
            suggestion.id,
            session.id
        );

        Ok((suggestion, message))
    }

    /// Returns the live handle for a session, loading it on first use.
    async fn live(&self, session_id: &str) -> Result<Arc<Mutex<ChatSession>>> {
        if let Some(live) = self.live.read().await.get(session_id) {
            return Ok(live.clone());
        }

        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .filter(|s| !s.is_closed())
            .ok_or_else(|| RedraftError::not_found("Session", session_id))?;

        let mut live = self.live.write().await;
        if let Some(existing) = live.get(session_id) {
            return Ok(existing.clone());
        }
        let closed_here = self
            .closed
            .read()
            .map_err(|_| RedraftError::internal("closed session set poisoned"))?
            .contains(session_id);
        if closed_here {
            return Err(RedraftError::not_found("Session", session_id));
        }

        for suggestion in session
            .messages
            .iter()
            .filter_map(|m| m.edit_suggestion.as_ref())
        {
            self.index_suggestion(&suggestion.id, session_id);
        }
        let state = match session.pending_suggestion() {
            Some(suggestion) => PendingState::Pending {
                suggestion: suggestion.clone(),
            },
            None => PendingState::Idle,
        };
        self.bus.seed(session_id, state);

        tracing::debug!("[SuggestionLifecycleManager] Loaded session {}", session_id);
        let handle = Arc::new(Mutex::new(session));
        live.insert(session_id.to_string(), handle.clone());
        Ok(handle)
    }

    fn index_suggestion(&self, suggestion_id: &str, session_id: &str) {
        if let Ok(mut index) = self.suggestion_index.write() {
            index.insert(suggestion_id.to_string(), session_id.to_string());
        }
    }
}

fn ensure_open(session: &ChatSession) -> Result<()> {
    if session.is_closed() {
        return Err(RedraftError::not_found("Session", session.id.clone()));
    }
    Ok(())
}

/// The suggestion, if it exists in the session and is still pending.
fn resolvable<'a>(session: &'a ChatSession, suggestion_id: &str) -> Result<&'a EditSuggestion> {
    let suggestion = session
        .find_suggestion(suggestion_id)
        .ok_or_else(|| RedraftError::not_found("Suggestion", suggestion_id))?;

    if !suggestion.is_pending() {
        tracing::warn!(
            "[SuggestionLifecycleManager] Suggestion {} is already {}",
            suggestion_id,
            suggestion.status
        );
        return Err(RedraftError::conflict(format!(
            "Suggestion '{}' is already {}",
            suggestion_id, suggestion.status
        )));
    }
    Ok(suggestion)
}

#[cfg(test)]
mod tests {
    use crate::EditingUseCase;
    use async_trait::async_trait;
    use redraft_core::Result;
    use redraft_core::config::EngineConfig;
    use redraft_core::document::DocumentKind;
    use redraft_core::generation::{GenerationReply, GenerationRequest, TextGenerator};
    use std::sync::Arc;

    struct Rewriter;

    #[async_trait]
    impl TextGenerator for Rewriter {
        async fn generate(&self, _request: GenerationRequest) -> Result<GenerationReply> {
            Ok(GenerationReply::with_suggestion("Try this.", "Sharper.", "tighten"))
        }
    }

    #[tokio::test]
    async fn test_close_releases_session_state() {
        let app = EditingUseCase::in_memory(Arc::new(Rewriter), EngineConfig::default());
        let doc = app
            .create_document(DocumentKind::ProfileSummary, "Blunt.")
            .await
            .unwrap();
        let session_id = app.create_session(&doc.id).await.unwrap();
        app.send_message(&session_id, "tighten it").await.unwrap();

        let manager = app.manager();
        assert_eq!(manager.live.read().await.len(), 1);
        assert_eq!(manager.suggestion_index.read().unwrap().len(), 1);

        app.close_session(&session_id).await.unwrap();

        assert!(manager.live.read().await.is_empty());
        assert!(manager.suggestion_index.read().unwrap().is_empty());
        // A closed session is not reloaded into memory.
        assert!(manager.get_session(&session_id).await.unwrap_err().is_not_found());
        assert!(manager.live.read().await.is_empty());
    }
}
