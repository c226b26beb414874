use anyhow::{Context, Result};
use colored::Colorize;
use redraft_application::EditingUseCase;
use redraft_core::document::{Document, DocumentKind};
use std::path::Path;

use super::read_text;
use crate::render;

/// Creates a document from `file` and prints its ID.
pub async fn import(editing: &EditingUseCase, kind: DocumentKind, file: &Path) -> Result<()> {
    let document = import_file(editing, kind, file).await?;
    println!("{}", document.id);
    Ok(())
}

async fn import_file(editing: &EditingUseCase, kind: DocumentKind, file: &Path) -> Result<Document> {
    let text = read_text(file)?;
    let document = editing
        .create_document(kind, text.trim_end())
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;
    Ok(document)
}

pub async fn list(editing: &EditingUseCase) -> Result<()> {
    let documents = editing.list_documents().await?;
    if documents.is_empty() {
        println!("{}", "No documents yet. Add one with `redraft import`.".bright_black());
        return Ok(());
    }
    for document in &documents {
        println!("{}", render::document_line(document));
    }
    Ok(())
}

pub async fn versions(editing: &EditingUseCase, document_id: &str) -> Result<()> {
    for version in editing.list_versions(document_id).await? {
        println!("{}", render::version_line(&version));
    }
    Ok(())
}

pub async fn restore(editing: &EditingUseCase, document_id: &str, version: u32) -> Result<()> {
    let document = editing
        .restore_version(document_id, version)
        .await
        .with_context(|| format!("Failed to restore {} to version {}", document_id, version))?;
    println!(
        "{}",
        format!(
            "Restored version {} as version {}.",
            version, document.current_version_number
        )
        .bright_green()
    );
    Ok(())
}

pub async fn show(editing: &EditingUseCase, document_id: &str, version: Option<u32>) -> Result<()> {
    let text = match version {
        Some(n) => editing.get_version(document_id, n).await?.content,
        None => editing.get_document(document_id).await?.current_text,
    };
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::App;
    use redraft_infrastructure::RedraftPaths;
    use tempfile::TempDir;

    fn offline_app(temp_dir: &TempDir) -> App {
        App::open(&RedraftPaths::new(Some(temp_dir.path().to_path_buf())), false).unwrap()
    }

    #[tokio::test]
    async fn test_import_creates_first_version() {
        let temp_dir = TempDir::new().unwrap();
        let app = offline_app(&temp_dir);
        let file = temp_dir.path().join("summary.txt");
        std::fs::write(&file, "Keeps a tight guard.\n").unwrap();

        let document = import_file(&app.editing, DocumentKind::AnalysisSummary, &file)
            .await
            .unwrap();

        assert_eq!(document.current_text, "Keeps a tight guard.");
        assert_eq!(document.current_version_number, 1);
        assert_eq!(app.editing.list_versions(&document.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_unknown_document_fails() {
        let temp_dir = TempDir::new().unwrap();
        let app = offline_app(&temp_dir);

        let err = restore(&app.editing, "missing", 1).await.unwrap_err();
        assert!(err.to_string().contains("Failed to restore missing"));
    }

    #[tokio::test]
    async fn test_show_unknown_version_fails() {
        let temp_dir = TempDir::new().unwrap();
        let app = offline_app(&temp_dir);
        let document = app
            .editing
            .create_document(DocumentKind::ProfileSummary, "Southpaw.")
            .await
            .unwrap();

        assert!(show(&app.editing, &document.id, Some(9)).await.is_err());
        assert!(show(&app.editing, &document.id, Some(1)).await.is_ok());
    }
}
