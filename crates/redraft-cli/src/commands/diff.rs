use anyhow::{Context, Result};
use redraft_core::diff::{DiffSummary, diff_with_window};
use std::path::Path;

use crate::render;

pub fn run(old: &Path, new: &Path, window: usize) -> Result<()> {
    let old_text = std::fs::read_to_string(old)
        .with_context(|| format!("Failed to read {}", old.display()))?;
    let new_text = std::fs::read_to_string(new)
        .with_context(|| format!("Failed to read {}", new.display()))?;

    let segments = diff_with_window(&old_text, &new_text, window);
    println!("{}", render::segments(&segments));
    println!();
    println!("{}", render::summary(&DiffSummary::from_segments(&segments)));
    Ok(())
}
