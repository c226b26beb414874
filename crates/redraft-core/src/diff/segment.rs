//! Diff segment types.

use serde::{Deserialize, Serialize};

/// What a segment of a diff represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Text present in both the old and the new version.
    Same,
    /// Text only present in the new version.
    Added,
    /// Text only present in the old version.
    Removed,
}

/// A typed span of text describing part of the difference between two texts.
///
/// Never persisted; recomputed on demand from an `(old, new)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub text: String,
}

impl DiffSegment {
    pub fn same(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Same,
            text: text.into(),
        }
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Added,
            text: text.into(),
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Removed,
            text: text.into(),
        }
    }

    /// Whether this segment is part of the old text.
    pub fn in_old(&self) -> bool {
        matches!(self.kind, SegmentKind::Same | SegmentKind::Removed)
    }

    /// Whether this segment is part of the new text.
    pub fn in_new(&self) -> bool {
        matches!(self.kind, SegmentKind::Same | SegmentKind::Added)
    }
}

/// Rebuilds the old text from `same` and `removed` segments.
pub fn reconstruct_old(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.in_old())
        .map(|s| s.text.as_str())
        .collect()
}

/// Rebuilds the new text from `same` and `added` segments.
pub fn reconstruct_new(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.in_new())
        .map(|s| s.text.as_str())
        .collect()
}

/// Word counts per segment kind, for one-line change descriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub unchanged_words: usize,
    pub added_words: usize,
    pub removed_words: usize,
}

impl DiffSummary {
    pub fn from_segments(segments: &[DiffSegment]) -> Self {
        let mut summary = Self::default();
        for segment in segments {
            let words = segment.text.split_whitespace().count();
            match segment.kind {
                SegmentKind::Same => summary.unchanged_words += words,
                SegmentKind::Added => summary.added_words += words,
                SegmentKind::Removed => summary.removed_words += words,
            }
        }
        summary
    }

    pub fn is_unchanged(&self) -> bool {
        self.added_words == 0 && self.removed_words == 0
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "+{} -{} ({} unchanged)",
            self.added_words, self.removed_words, self.unchanged_words
        )
    }
}
