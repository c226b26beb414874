//! Version store.
//!
//! Append-only, per-document snapshot log with a single current pointer.
//! Every write goes through [`VersionStore`], which serialises writers per
//! document before handing the append to the repository's atomic primitive.

use redraft_core::diff::{DiffSegment, diff_with_window};
use redraft_core::document::{
    Document, DocumentKind, DocumentRepository, EditedBy, NewVersion, Version,
};
use redraft_core::{RedraftError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Reason recorded on the first version of a generated document.
pub const INITIAL_REASON: &str = "initial generation";

pub struct VersionStore {
    repository: Arc<dyn DocumentRepository>,
    /// One async lock per document ID with a writer holding or waiting.
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
    diff_window: usize,
}

impl VersionStore {
    pub fn new(repository: Arc<dyn DocumentRepository>, diff_window: usize) -> Self {
        Self {
            repository,
            locks: std::sync::Mutex::new(HashMap::new()),
            diff_window,
        }
    }

    async fn lock_document(&self, document_id: &str) -> Result<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| RedraftError::internal("document lock table poisoned"))?;
            // Only the table holds an idle lock; a holder or waiter owns a clone.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(document_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        Ok(lock.lock_owned().await)
    }

    /// Creates a document from generated text and records it as version 1.
    pub async fn create_document(&self, kind: DocumentKind, text: &str) -> Result<Document> {
        let document = Document::new(kind, text);
        self.repository.insert(&document).await?;

        let _guard = self.lock_document(&document.id).await?;
        let (document, _) = self
            .repository
            .append_version(
                &document.id,
                NewVersion::new(text, EditedBy::Ai, INITIAL_REASON),
            )
            .await?;

        tracing::info!(
            "[VersionStore] Created {} document {}",
            document.kind,
            document.id
        );
        Ok(document)
    }

    /// Stores a document as given, without writing a version.
    pub async fn register_document(&self, document: &Document) -> Result<()> {
        self.repository.insert(document).await?;
        tracing::debug!("[VersionStore] Registered document {}", document.id);
        Ok(())
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Document> {
        self.repository
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| RedraftError::not_found("Document", document_id))
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        self.repository.list_all().await
    }

    /// Appends the next version and moves the current pointer to it.
    pub async fn append_version(
        &self,
        document_id: &str,
        content: &str,
        edited_by: EditedBy,
        reason: &str,
    ) -> Result<Version> {
        let _guard = self.lock_document(document_id).await?;
        let (_, version) = self
            .write(document_id, NewVersion::new(content, edited_by, reason))
            .await?;
        Ok(version)
    }

    /// Appends a version only if the document still reads `expected_text`.
    ///
    /// The check and the append happen under the same per-document lock.
    /// Fails with `Conflict` if the document has moved on.
    pub async fn append_version_if_unchanged(
        &self,
        document_id: &str,
        expected_text: &str,
        version: NewVersion,
    ) -> Result<(Document, Version)> {
        let _guard = self.lock_document(document_id).await?;

        let current = self.get_document(document_id).await?;
        if current.current_text != expected_text {
            tracing::warn!(
                "[VersionStore] Document {} changed since v{} was read",
                document_id,
                current.current_version_number
            );
            return Err(RedraftError::conflict(format!(
                "Document '{}' changed since the suggestion was made",
                document_id
            )));
        }

        self.write(document_id, version).await
    }

    /// Lists every version of a document, oldest first.
    pub async fn list_versions(&self, document_id: &str) -> Result<Vec<Version>> {
        self.repository.list_versions(document_id).await
    }

    pub async fn get_version(&self, document_id: &str, version_number: u32) -> Result<Version> {
        self.repository
            .find_version(document_id, version_number)
            .await?
            .ok_or_else(|| {
                RedraftError::not_found("Version", format!("{}@v{}", document_id, version_number))
            })
    }

    /// Makes an old version current again by appending a copy of it.
    ///
    /// History is never rewritten; restoring v1 on a document at v3 yields v4.
    pub async fn restore_version(&self, document_id: &str, version_number: u32) -> Result<Document> {
        let _guard = self.lock_document(document_id).await?;

        let target = self.get_version(document_id, version_number).await?;
        let (document, _) = self
            .write(
                document_id,
                NewVersion::new(
                    target.content,
                    EditedBy::User,
                    format!("restored from version {}", version_number),
                ),
            )
            .await?;
        Ok(document)
    }

    /// Records a hand edit of the document.
    pub async fn save_manual_edit(
        &self,
        document_id: &str,
        content: &str,
        reason: &str,
    ) -> Result<Version> {
        let _guard = self.lock_document(document_id).await?;

        let current = self.get_document(document_id).await?;
        if current.current_text == content {
            return Err(RedraftError::validation("manual edit does not change the document"));
        }

        let reason = match reason.trim() {
            "" => "manual edit",
            trimmed => trimmed,
        };
        let (_, version) = self
            .write(document_id, NewVersion::new(content, EditedBy::User, reason))
            .await?;
        Ok(version)
    }

    /// Word diff between two stored versions of a document.
    pub async fn diff_versions(
        &self,
        document_id: &str,
        from: u32,
        to: u32,
    ) -> Result<Vec<DiffSegment>> {
        let old = self.get_version(document_id, from).await?;
        let new = self.get_version(document_id, to).await?;
        Ok(diff_with_window(&old.content, &new.content, self.diff_window))
    }

    pub fn diff_window(&self) -> usize {
        self.diff_window
    }

    /// Callers hold the document lock.
    async fn write(&self, document_id: &str, version: NewVersion) -> Result<(Document, Version)> {
        let (document, written) = self.repository.append_version(document_id, version).await?;
        tracing::info!(
            "[VersionStore] Wrote version {} of document {} ({}: {})",
            written.version_number,
            document_id,
            written.edited_by,
            written.edit_reason
        );
        Ok((document, written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::diff::SegmentKind;
    use redraft_infrastructure::InMemoryDocumentRepository;

    fn store() -> VersionStore {
        VersionStore::new(Arc::new(InMemoryDocumentRepository::new()), 10)
    }

    #[tokio::test]
    async fn test_create_document_writes_first_version() {
        let store = store();
        let doc = store
            .create_document(DocumentKind::AnalysisSummary, "The guard is strong.")
            .await
            .unwrap();

        assert_eq!(doc.current_version_number, 1);
        let versions = store.list_versions(&doc.id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].edited_by, EditedBy::Ai);
        assert_eq!(versions[0].edit_reason, INITIAL_REASON);
    }

    #[tokio::test]
    async fn test_registered_document_starts_without_versions() {
        let store = store();
        let doc = Document::new(DocumentKind::ProfileSummary, "imported");
        store.register_document(&doc).await.unwrap();

        assert!(store.list_versions(&doc.id).await.unwrap().is_empty());

        let v = store
            .append_version(&doc.id, "edited", EditedBy::User, "first edit")
            .await
            .unwrap();
        assert_eq!(v.version_number, 1);
    }

    #[tokio::test]
    async fn test_n_appends_are_numbered_one_to_n() {
        let store = store();
        let doc = Document::new(DocumentKind::AnalysisSummary, "");
        store.register_document(&doc).await.unwrap();

        for i in 1..=5 {
            let v = store
                .append_version(&doc.id, &format!("text {i}"), EditedBy::User, "edit")
                .await
                .unwrap();
            assert_eq!(v.version_number, i);
        }

        let versions = store.list_versions(&doc.id).await.unwrap();
        let current: Vec<u32> = versions
            .iter()
            .filter(|v| v.is_current)
            .map(|v| v.version_number)
            .collect();
        assert_eq!(current, vec![5]);
        assert_eq!(store.get_document(&doc.id).await.unwrap().current_text, "text 5");
    }

    #[tokio::test]
    async fn test_restore_appends_copy_of_old_version() {
        let store = store();
        let doc = store
            .create_document(DocumentKind::AnalysisSummary, "one")
            .await
            .unwrap();
        store
            .append_version(&doc.id, "two", EditedBy::Ai, "r")
            .await
            .unwrap();
        store
            .append_version(&doc.id, "three", EditedBy::User, "r")
            .await
            .unwrap();

        let restored = store.restore_version(&doc.id, 1).await.unwrap();
        assert_eq!(restored.current_version_number, 4);
        assert_eq!(restored.current_text, "one");

        let versions = store.list_versions(&doc.id).await.unwrap();
        let contents: Vec<&str> = versions.iter().map(|v| v.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three", "one"]);
        assert_eq!(versions[3].edit_reason, "restored from version 1");
        assert_eq!(versions[3].edited_by, EditedBy::User);
    }

    #[tokio::test]
    async fn test_restore_missing_version_is_not_found() {
        let store = store();
        let doc = store
            .create_document(DocumentKind::AnalysisSummary, "one")
            .await
            .unwrap();

        assert!(store.restore_version(&doc.id, 9).await.unwrap_err().is_not_found());
        assert!(store.restore_version("nope", 1).await.unwrap_err().is_not_found());
        assert_eq!(store.list_versions(&doc.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conditional_append_detects_stale_text() {
        let store = store();
        let doc = store
            .create_document(DocumentKind::AnalysisSummary, "one")
            .await
            .unwrap();
        store
            .append_version(&doc.id, "two", EditedBy::User, "r")
            .await
            .unwrap();

        let err = store
            .append_version_if_unchanged(&doc.id, "one", NewVersion::new("x", EditedBy::Ai, "r"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.list_versions(&doc.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_manual_edit_requires_change() {
        let store = store();
        let doc = store
            .create_document(DocumentKind::ProfileSummary, "same")
            .await
            .unwrap();

        let err = store.save_manual_edit(&doc.id, "same", "").await.unwrap_err();
        assert!(err.is_validation());

        let v = store.save_manual_edit(&doc.id, "changed", "").await.unwrap();
        assert_eq!(v.edit_reason, "manual edit");
        assert_eq!(v.edited_by, EditedBy::User);
    }

    #[tokio::test]
    async fn test_diff_versions() {
        let store = store();
        let doc = store
            .create_document(DocumentKind::AnalysisSummary, "The guard is strong.")
            .await
            .unwrap();
        store
            .append_version(&doc.id, "The guard is strong and mobile.", EditedBy::Ai, "r")
            .await
            .unwrap();

        let segments = store.diff_versions(&doc.id, 1, 2).await.unwrap();
        assert!(segments.iter().any(|s| s.kind == SegmentKind::Added));
        assert!(store.diff_versions(&doc.id, 1, 3).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_idle_document_locks_are_dropped() {
        let store = store();
        for i in 0..5 {
            let doc = store
                .create_document(DocumentKind::AnalysisSummary, &format!("doc {i}"))
                .await
                .unwrap();
            store
                .append_version(&doc.id, "edited", EditedBy::User, "r")
                .await
                .unwrap();
        }

        // The last write's entry stays until the next lock is taken.
        assert!(store.locks.lock().unwrap().len() <= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_through_store() {
        let store = Arc::new(store());
        let doc = store
            .create_document(DocumentKind::AnalysisSummary, "base")
            .await
            .unwrap();

        let tasks = (0..10).map(|i| {
            let store = store.clone();
            let id = doc.id.clone();
            async move {
                store
                    .append_version(&id, &format!("v{i}"), EditedBy::User, "r")
                    .await
            }
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        let versions = store.list_versions(&doc.id).await.unwrap();
        let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, (1..=11).collect::<Vec<_>>());
        assert_eq!(versions.iter().filter(|v| v.is_current).count(), 1);
    }
}
