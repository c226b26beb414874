//! Document repository trait.
//!
//! Defines the interface for document and version persistence operations.

use super::model::{Document, NewVersion, Version};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for documents and their version logs.
///
/// This is the persistence collaborator of the version store. Implementations
/// decide where records live (memory, TOML files, a database) but must honour
/// the contract of [`DocumentRepository::append_version`].
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Finds a document by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Document))`: Document found
    /// - `Ok(None)`: Document not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, document_id: &str) -> Result<Option<Document>>;

    /// Stores a new document.
    ///
    /// Fails with `Conflict` if a document with the same ID already exists.
    /// The document is stored as given; no version is written.
    async fn insert(&self, document: &Document) -> Result<()>;

    /// Lists all stored documents.
    async fn list_all(&self) -> Result<Vec<Document>>;

    /// Returns all versions of a document, ascending by version number.
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn list_versions(&self, document_id: &str) -> Result<Vec<Version>>;

    /// Finds one version of a document.
    ///
    /// Fails with `NotFound` if the document does not exist; returns
    /// `Ok(None)` if the document exists but has no such version.
    async fn find_version(&self, document_id: &str, version_number: u32)
    -> Result<Option<Version>>;

    /// Appends the next version of a document.
    ///
    /// This is the atomicity primitive the engine relies on. In one
    /// all-or-nothing step the implementation must:
    /// - number the version `current max + 1`
    /// - clear `is_current` on the previous current version and set it on the new one
    /// - update the document's `current_text` and `current_version_number`
    ///
    /// Concurrent calls on the same document must never produce two versions
    /// with the same number or two current versions. On error nothing is
    /// written.
    ///
    /// # Returns
    ///
    /// The updated document and the version that was written.
    async fn append_version(
        &self,
        document_id: &str,
        version: NewVersion,
    ) -> Result<(Document, Version)>;
}
