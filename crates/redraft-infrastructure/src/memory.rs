//! In-memory repositories.
//!
//! Used by tests and by callers that do not need durability. Each document's
//! history sits behind one write lock, so `append_version` is trivially
//! all-or-nothing.

use async_trait::async_trait;
use redraft_core::document::{Document, DocumentHistory, DocumentRepository, NewVersion, Version};
use redraft_core::session::{ChatSession, SessionRepository};
use redraft_core::{RedraftError, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    histories: RwLock<HashMap<String, DocumentHistory>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn find_by_id(&self, document_id: &str) -> Result<Option<Document>> {
        let histories = self.histories.read().await;
        Ok(histories.get(document_id).map(|h| h.document.clone()))
    }

    async fn insert(&self, document: &Document) -> Result<()> {
        let mut histories = self.histories.write().await;
        if histories.contains_key(&document.id) {
            return Err(RedraftError::conflict(format!(
                "Document '{}' already exists",
                document.id
            )));
        }
        histories.insert(document.id.clone(), DocumentHistory::new(document.clone()));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Document>> {
        let histories = self.histories.read().await;
        let mut documents: Vec<Document> =
            histories.values().map(|h| h.document.clone()).collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(documents)
    }

    async fn list_versions(&self, document_id: &str) -> Result<Vec<Version>> {
        let histories = self.histories.read().await;
        histories
            .get(document_id)
            .map(|h| h.versions.clone())
            .ok_or_else(|| RedraftError::not_found("Document", document_id))
    }

    async fn find_version(
        &self,
        document_id: &str,
        version_number: u32,
    ) -> Result<Option<Version>> {
        let histories = self.histories.read().await;
        let history = histories
            .get(document_id)
            .ok_or_else(|| RedraftError::not_found("Document", document_id))?;
        Ok(history.version(version_number).cloned())
    }

    async fn append_version(
        &self,
        document_id: &str,
        version: NewVersion,
    ) -> Result<(Document, Version)> {
        let mut histories = self.histories.write().await;
        let history = histories
            .get_mut(document_id)
            .ok_or_else(|| RedraftError::not_found("Document", document_id))?;
        let written = history.append(version);
        Ok((history.document.clone(), written))
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, ChatSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(&self, session: &ChatSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_suggestion(&self, suggestion_id: &str) -> Result<Option<ChatSession>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.find_suggestion(suggestion_id).is_some())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::document::{DocumentKind, EditedBy};
    use redraft_core::session::{Message, SuggestionDraft};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_twice_conflicts() {
        let repo = InMemoryDocumentRepository::new();
        let doc = Document::new(DocumentKind::AnalysisSummary, "text");

        repo.insert(&doc).await.unwrap();
        assert!(repo.insert(&doc).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let repo = InMemoryDocumentRepository::new();

        assert!(repo.list_versions("nope").await.unwrap_err().is_not_found());
        assert!(repo.find_version("nope", 1).await.unwrap_err().is_not_found());
        assert!(
            repo.append_version("nope", NewVersion::new("x", EditedBy::User, "r"))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_number_contiguously() {
        let repo = Arc::new(InMemoryDocumentRepository::new());
        let doc = Document::new(DocumentKind::ProfileSummary, "");
        repo.insert(&doc).await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let repo = repo.clone();
                let id = doc.id.clone();
                tokio::spawn(async move {
                    repo.append_version(&id, NewVersion::new(format!("v{i}"), EditedBy::User, "r"))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let versions = repo.list_versions(&doc.id).await.unwrap();
        let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, (1..=20).collect::<Vec<_>>());
        assert_eq!(versions.iter().filter(|v| v.is_current).count(), 1);
        assert!(versions.last().unwrap().is_current);
    }

    #[tokio::test]
    async fn test_session_found_by_suggestion() {
        let repo = InMemorySessionRepository::new();
        let mut a = ChatSession::new("doc-a");
        let suggestion = SuggestionDraft::new("new", "why")
            .into_suggestion("old")
            .unwrap();
        a.append(Message::model("Try this.").with_suggestion(suggestion.clone()));
        let b = ChatSession::new("doc-b");
        repo.save(&a).await.unwrap();
        repo.save(&b).await.unwrap();

        let found = repo.find_by_suggestion(&suggestion.id).await.unwrap().unwrap();
        assert_eq!(found.id, a.id);
        assert!(repo.find_by_suggestion("unknown").await.unwrap().is_none());
    }
}
