//! Document and version domain models.

use serde::{Deserialize, Serialize};

/// The kind of generated text a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    /// Summary of a fight/technique analysis.
    AnalysisSummary,
    /// Summary of an athlete or opponent profile.
    ProfileSummary,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::AnalysisSummary => write!(f, "analysis summary"),
            DocumentKind::ProfileSummary => write!(f, "profile summary"),
        }
    }
}

/// Who produced a version's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditedBy {
    /// A manual save or a restore.
    User,
    /// An accepted AI suggestion or the initial generation.
    Ai,
    /// Written straight from a suggestion without human review.
    AiSuggestion,
}

impl std::fmt::Display for EditedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditedBy::User => write!(f, "user"),
            EditedBy::Ai => write!(f, "ai"),
            EditedBy::AiSuggestion => write!(f, "ai_suggestion"),
        }
    }
}

/// The editable text artifact.
///
/// `current_version_number` is `0` for a document registered without any
/// version yet; otherwise it equals the number of the version flagged
/// `is_current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier (UUID format)
    pub id: String,
    pub kind: DocumentKind,
    pub current_text: String,
    pub current_version_number: u32,
    /// Timestamp when the document was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp of the last content change (ISO 8601 format)
    pub updated_at: String,
}

impl Document {
    /// Creates a document with no versions yet.
    pub fn new(kind: DocumentKind, text: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            current_text: text.into(),
            current_version_number: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// An immutable, numbered snapshot of a document's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub document_id: String,
    pub version_number: u32,
    pub content: String,
    pub edited_by: EditedBy,
    pub edit_reason: String,
    /// Timestamp when the version was written (ISO 8601 format)
    pub created_at: String,
    pub is_current: bool,
}

/// Input for appending a version; the number and flags are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub content: String,
    pub edited_by: EditedBy,
    pub edit_reason: String,
}

impl NewVersion {
    pub fn new(
        content: impl Into<String>,
        edited_by: EditedBy,
        edit_reason: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            edited_by,
            edit_reason: edit_reason.into(),
        }
    }
}

/// A document together with its full version log.
///
/// Persistence backends hold one of these per document and mutate it only
/// through [`DocumentHistory::append`], so numbering and the current pointer
/// follow the same rules everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHistory {
    pub document: Document,
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl DocumentHistory {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            versions: Vec::new(),
        }
    }

    /// Highest version number written so far (`0` when empty).
    pub fn current_max(&self) -> u32 {
        self.versions
            .last()
            .map(|v| v.version_number)
            .unwrap_or(0)
    }

    /// Appends the next version, moves the current pointer and updates the
    /// document. Infallible once called; callers persist the whole history
    /// afterwards.
    pub fn append(&mut self, new: NewVersion) -> Version {
        let now = chrono::Utc::now().to_rfc3339();
        let version_number = self.current_max() + 1;

        for version in self.versions.iter_mut().filter(|v| v.is_current) {
            version.is_current = false;
        }

        let version = Version {
            document_id: self.document.id.clone(),
            version_number,
            content: new.content,
            edited_by: new.edited_by,
            edit_reason: new.edit_reason,
            created_at: now.clone(),
            is_current: true,
        };
        self.versions.push(version.clone());

        self.document.current_text = version.content.clone();
        self.document.current_version_number = version_number;
        self.document.updated_at = now;

        version
    }

    pub fn version(&self, version_number: u32) -> Option<&Version> {
        self.versions
            .iter()
            .find(|v| v.version_number == version_number)
    }
}
