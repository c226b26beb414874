//! Word-level diff between two text blobs.
//!
//! - `engine`: the bounded heuristic diff (`diff`, `diff_with_window`)
//! - `segment`: `DiffSegment`, `SegmentKind`, reconstruction helpers and `DiffSummary`
//!
//! The engine is pure and stateless; it can be called from any thread
//! without synchronisation.

mod engine;
mod segment;

pub use engine::{DEFAULT_WINDOW, diff, diff_with_window};
pub use segment::{DiffSegment, DiffSummary, SegmentKind, reconstruct_new, reconstruct_old};
