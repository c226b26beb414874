//! Bounded heuristic diff.
//!
//! Walks both token sequences with two cursors. On a mismatch it looks at
//! most `window` tokens ahead in each sequence for the other side's current
//! token and resynchronises on the closer hit, preferring an addition on a
//! tie. When neither side resynchronises the two tokens are reported as a
//! direct substitution.
//!
//! This is not a minimum-edit-distance diff. Running time is
//! `O((n + m) * window)`, which keeps previews instant for prose-length
//! documents at the cost of occasionally reporting a larger change than
//! strictly necessary. Swapping in an optimal algorithm (e.g. Myers) changes
//! that trade-off and must keep the `diff(old, new) -> Vec<DiffSegment>`
//! contract.

use super::segment::{DiffSegment, SegmentKind};

/// Default forward search window, in tokens.
pub const DEFAULT_WINDOW: usize = 10;

/// Computes a word-level diff between `old` and `new` with the default window.
pub fn diff(old: &str, new: &str) -> Vec<DiffSegment> {
    diff_with_window(old, new, DEFAULT_WINDOW)
}

/// Computes a word-level diff with an explicit forward search window.
///
/// A window of `0` disables resynchronisation, so every mismatch becomes a
/// substitution.
pub fn diff_with_window(old: &str, new: &str, window: usize) -> Vec<DiffSegment> {
    if old == new {
        return if old.is_empty() {
            Vec::new()
        } else {
            vec![DiffSegment::same(old)]
        };
    }
    if old.is_empty() {
        return vec![DiffSegment::added(new)];
    }
    if new.is_empty() {
        return vec![DiffSegment::removed(old)];
    }

    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    let mut out = SegmentBuilder::default();

    let (mut i, mut j) = (0, 0);
    while i < old_tokens.len() && j < new_tokens.len() {
        if old_tokens[i] == new_tokens[j] {
            out.push(SegmentKind::Same, old_tokens[i]);
            i += 1;
            j += 1;
            continue;
        }

        let added_gap = find_ahead(&new_tokens, j, old_tokens[i], window);
        let removed_gap = find_ahead(&old_tokens, i, new_tokens[j], window);

        match (added_gap, removed_gap) {
            (Some(a), Some(r)) if a <= r => {
                out.extend(SegmentKind::Added, &new_tokens[j..j + a]);
                j += a;
            }
            (Some(a), None) => {
                out.extend(SegmentKind::Added, &new_tokens[j..j + a]);
                j += a;
            }
            (_, Some(r)) => {
                out.extend(SegmentKind::Removed, &old_tokens[i..i + r]);
                i += r;
            }
            (None, None) => {
                out.push(SegmentKind::Removed, old_tokens[i]);
                out.push(SegmentKind::Added, new_tokens[j]);
                i += 1;
                j += 1;
            }
        }
    }

    out.extend(SegmentKind::Removed, &old_tokens[i..]);
    out.extend(SegmentKind::Added, &new_tokens[j..]);
    out.finish()
}

/// Splits text into alternating runs of whitespace and non-whitespace.
///
/// Concatenating the tokens yields the input exactly.
pub(crate) fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Distance from `from` to the next occurrence of `needle` in
/// `tokens[from + 1..=from + window]`.
fn find_ahead(tokens: &[&str], from: usize, needle: &str, window: usize) -> Option<usize> {
    (1..=window)
        .take_while(|k| from + k < tokens.len())
        .find(|k| tokens[from + k] == needle)
}

/// Accumulates segments, merging adjacent runs of the same kind.
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<DiffSegment>,
}

impl SegmentBuilder {
    fn push(&mut self, kind: SegmentKind, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(text),
            _ => self.segments.push(DiffSegment {
                kind,
                text: text.to_string(),
            }),
        }
    }

    fn extend(&mut self, kind: SegmentKind, tokens: &[&str]) {
        for token in tokens {
            self.push(kind, token);
        }
    }

    fn finish(self) -> Vec<DiffSegment> {
        self.segments
    }
}
