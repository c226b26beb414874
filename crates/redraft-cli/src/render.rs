//! Terminal rendering of diffs, versions and documents.

use colored::Colorize;
use redraft_core::diff::{DiffSegment, DiffSummary, SegmentKind};
use redraft_core::document::{Document, Version};

/// Renders segments inline: removals red and struck through, additions green.
pub fn segments(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .map(|segment| match segment.kind {
            SegmentKind::Same => segment.text.normal().to_string(),
            SegmentKind::Added => segment.text.green().bold().to_string(),
            SegmentKind::Removed => segment.text.red().strikethrough().to_string(),
        })
        .collect()
}

pub fn summary(summary: &DiffSummary) -> String {
    if summary.is_unchanged() {
        return "no changes".bright_black().to_string();
    }
    summary.to_string().bright_black().to_string()
}

pub fn version_line(version: &Version) -> String {
    let marker = if version.is_current { "*" } else { " " };
    let line = format!(
        "{} v{:<3} {:<13} {}  {}",
        marker, version.version_number, version.edited_by, version.created_at, version.edit_reason
    );
    if version.is_current {
        line.bold().to_string()
    } else {
        line
    }
}

pub fn document_line(document: &Document) -> String {
    let preview: String = document.current_text.chars().take(48).collect();
    let ellipsis = if document.current_text.chars().count() > 48 { "…" } else { "" };
    format!(
        "{}  {:<15} v{:<3} {}{}",
        document.id.bright_cyan(),
        document.kind,
        document.current_version_number,
        preview.replace('\n', " "),
        ellipsis
    )
}
