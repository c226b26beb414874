pub mod diff;
pub mod documents;

use anyhow::{Context, Result, bail};
use std::path::Path;

/// Reads a UTF-8 text file, refusing blank content.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if text.trim().is_empty() {
        bail!("{} is empty", path.display());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_text_rejects_blank_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.txt");
        std::fs::write(&path, "  \n").unwrap();

        let err = read_text(&path).unwrap_err();
        assert!(err.to_string().ends_with("is empty"));
    }

    #[test]
    fn test_read_text_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_text(&temp_dir.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
