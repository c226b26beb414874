//! TOML-based document repository.
//!
//! Each document lives in `documents/<id>.toml` together with its full
//! version log. Appending a version is a locked read-modify-write of that one
//! file, so the version row and the document's current pointer can never be
//! observed out of step.

use crate::storage::{AtomicTomlFile, RecordDir, run_blocking};
use async_trait::async_trait;
use redraft_core::document::{Document, DocumentHistory, DocumentRepository, NewVersion, Version};
use redraft_core::{RedraftError, Result};
use std::path::PathBuf;

pub struct TomlDocumentRepository {
    dir: RecordDir,
}

impl TomlDocumentRepository {
    /// Creates a repository rooted at `documents_dir`, creating it if needed.
    pub fn new(documents_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            dir: RecordDir::open(documents_dir)?,
        })
    }

    fn history_file(&self, document_id: &str) -> Result<AtomicTomlFile<DocumentHistory>> {
        self.dir.file(document_id)
    }

    async fn load_history(&self, document_id: &str) -> Result<Option<DocumentHistory>> {
        let file = self.history_file(document_id)?;
        run_blocking(move || Ok(file.load()?)).await
    }

    async fn require_history(&self, document_id: &str) -> Result<DocumentHistory> {
        self.load_history(document_id)
            .await?
            .ok_or_else(|| RedraftError::not_found("Document", document_id))
    }
}

#[async_trait]
impl DocumentRepository for TomlDocumentRepository {
    async fn find_by_id(&self, document_id: &str) -> Result<Option<Document>> {
        Ok(self.load_history(document_id).await?.map(|h| h.document))
    }

    async fn insert(&self, document: &Document) -> Result<()> {
        let file = self.history_file(&document.id)?;
        let history = DocumentHistory::new(document.clone());
        let id = document.id.clone();

        run_blocking(move || match file.create(&history) {
            Ok(()) => Ok(()),
            Err(crate::storage::AtomicTomlError::AlreadyExists(_)) => Err(
                RedraftError::conflict(format!("Document '{}' already exists", id)),
            ),
            Err(e) => Err(e.into()),
        })
        .await?;

        tracing::debug!("[TomlDocumentRepository] Inserted document {}", document.id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Document>> {
        let dir = self.dir.clone();
        let histories: Vec<DocumentHistory> = run_blocking(move || dir.load_all()).await?;

        let mut documents: Vec<Document> = histories.into_iter().map(|h| h.document).collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(documents)
    }

    async fn list_versions(&self, document_id: &str) -> Result<Vec<Version>> {
        Ok(self.require_history(document_id).await?.versions)
    }

    async fn find_version(
        &self,
        document_id: &str,
        version_number: u32,
    ) -> Result<Option<Version>> {
        let history = self.require_history(document_id).await?;
        Ok(history.version(version_number).cloned())
    }

    async fn append_version(
        &self,
        document_id: &str,
        version: NewVersion,
    ) -> Result<(Document, Version)> {
        let file = self.history_file(document_id)?;
        let id = document_id.to_string();

        let (document, written) = run_blocking(move || {
            if !file.exists() {
                return Err(RedraftError::not_found("Document", id));
            }
            file.update(|history: &mut DocumentHistory| {
                let written = history.append(version);
                Ok::<_, RedraftError>((history.document.clone(), written))
            })
        })
        .await?;

        tracing::debug!(
            "[TomlDocumentRepository] Appended version {} to document {}",
            written.version_number,
            document.id
        );
        Ok((document, written))
    }
}
