//! Editing use case implementation.
//!
//! `EditingUseCase` is the facade UIs talk to. It wires the version store,
//! the suggestion lifecycle manager and the edit gateway around one pair of
//! repositories and one text generator.

use crate::event_bus::SuggestionBus;
use crate::suggestion::{EditGateway, SuggestionLifecycleManager, SuggestionPreview};
use crate::version_store::VersionStore;
use redraft_core::Result;
use redraft_core::config::EngineConfig;
use redraft_core::diff::DiffSegment;
use redraft_core::document::{Document, DocumentKind, DocumentRepository, Version};
use redraft_core::generation::TextGenerator;
use redraft_core::session::{ChatSession, EditSuggestion, Message, SessionRepository};
use redraft_infrastructure::{InMemoryDocumentRepository, InMemorySessionRepository};
use std::sync::Arc;

/// Use case for editing generated documents with AI suggestions.
///
/// Accept and reject here go straight to the lifecycle manager. The shared
/// [`EditGateway`] recognises suggestions settled this way, so surfaces using
/// it still get the stored outcome.
pub struct EditingUseCase {
    versions: Arc<VersionStore>,
    manager: Arc<SuggestionLifecycleManager>,
    gateway: Arc<EditGateway>,
}

impl EditingUseCase {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        sessions: Arc<dyn SessionRepository>,
        generator: Arc<dyn TextGenerator>,
        config: EngineConfig,
    ) -> Self {
        let versions = Arc::new(VersionStore::new(documents, config.diff_window));
        let bus = Arc::new(SuggestionBus::new(config.event_capacity));
        let manager = Arc::new(SuggestionLifecycleManager::new(
            sessions,
            versions.clone(),
            generator,
            bus,
            config,
        ));
        let gateway = Arc::new(EditGateway::new(manager.clone()));

        Self {
            versions,
            manager,
            gateway,
        }
    }

    /// Builds a use case backed by in-memory repositories.
    pub fn in_memory(generator: Arc<dyn TextGenerator>, config: EngineConfig) -> Self {
        Self::new(
            Arc::new(InMemoryDocumentRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
            generator,
            config,
        )
    }

    pub fn versions(&self) -> &Arc<VersionStore> {
        &self.versions
    }

    pub fn manager(&self) -> &Arc<SuggestionLifecycleManager> {
        &self.manager
    }

    /// The shared gateway, for surfaces that observe or resolve suggestions.
    pub fn gateway(&self) -> Arc<EditGateway> {
        self.gateway.clone()
    }

    // Documents

    pub async fn create_document(&self, kind: DocumentKind, text: &str) -> Result<Document> {
        self.versions.create_document(kind, text).await
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Document> {
        self.versions.get_document(document_id).await
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        self.versions.list_documents().await
    }

    pub async fn list_versions(&self, document_id: &str) -> Result<Vec<Version>> {
        self.versions.list_versions(document_id).await
    }

    pub async fn get_version(&self, document_id: &str, version_number: u32) -> Result<Version> {
        self.versions.get_version(document_id, version_number).await
    }

    pub async fn restore_version(&self, document_id: &str, version_number: u32) -> Result<Document> {
        self.versions.restore_version(document_id, version_number).await
    }

    pub async fn save_manual_edit(
        &self,
        document_id: &str,
        content: &str,
        reason: &str,
    ) -> Result<Version> {
        self.versions.save_manual_edit(document_id, content, reason).await
    }

    pub async fn diff_versions(
        &self,
        document_id: &str,
        from: u32,
        to: u32,
    ) -> Result<Vec<DiffSegment>> {
        self.versions.diff_versions(document_id, from, to).await
    }

    // Sessions

    /// Starts a conversation about a document and returns its session ID.
    pub async fn create_session(&self, document_id: &str) -> Result<String> {
        Ok(self.manager.create_session(document_id).await?.id)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ChatSession> {
        self.manager.get_session(session_id).await
    }

    pub async fn send_message(&self, session_id: &str, text: &str) -> Result<Message> {
        self.manager.send_message(session_id, text).await
    }

    pub async fn pending_suggestion(&self, session_id: &str) -> Result<Option<EditSuggestion>> {
        self.manager.pending_suggestion(session_id).await
    }

    pub async fn preview_suggestion(&self, session_id: &str) -> Result<Option<SuggestionPreview>> {
        self.manager.preview_suggestion(session_id).await
    }

    /// Accepts a pending suggestion and returns the updated document.
    ///
    /// Strict: a second accept of the same suggestion fails with `Conflict`.
    /// Surfaces that may race each other use [`Self::gateway`] instead.
    pub async fn accept_suggestion(&self, session_id: &str, suggestion_id: &str) -> Result<Document> {
        Ok(self
            .manager
            .accept_suggestion(session_id, suggestion_id)
            .await?
            .document)
    }

    /// Rejects a pending suggestion and returns the acknowledgement message.
    pub async fn reject_suggestion(&self, session_id: &str, suggestion_id: &str) -> Result<Message> {
        self.manager.reject_suggestion(session_id, suggestion_id).await
    }

    pub async fn close_session(&self, session_id: &str) -> Result<()> {
        self.gateway.close_session(session_id).await
    }
}
