//! Composition root: wires config, storage and the generator into the use case.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redraft_application::EditingUseCase;
use redraft_core::generation::{GenerationReply, GenerationRequest, TextGenerator};
use redraft_core::RedraftError;
use redraft_infrastructure::{ConfigService, RedraftPaths, TomlDocumentRepository, TomlSessionRepository};
use redraft_interaction::ClaudeApiGenerator;
use std::sync::Arc;

/// Stands in for the generator on commands that never talk to the model.
struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _request: GenerationRequest) -> redraft_core::Result<GenerationReply> {
        Err(RedraftError::config("text generation is not available for this command"))
    }
}

pub struct App {
    pub editing: EditingUseCase,
}

impl App {
    /// Opens the data directory. With `online`, a Claude generator is
    /// configured from the environment and a missing API key is an error.
    pub fn open(paths: &RedraftPaths, online: bool) -> Result<Self> {
        let config = ConfigService::new(paths)?
            .get_config()
            .context("Failed to load config.toml")?;

        let documents = TomlDocumentRepository::new(paths.documents_dir()?)
            .context("Failed to open document store")?;
        let sessions = TomlSessionRepository::new(paths.sessions_dir()?)
            .context("Failed to open session store")?;

        let generator: Arc<dyn TextGenerator> = if online {
            let claude = ClaudeApiGenerator::try_from_env(&config.generator)
                .context("Chat needs ANTHROPIC_API_KEY to be set")?;
            tracing::info!("[bootstrap] Using model {}", claude.model());
            Arc::new(claude)
        } else {
            Arc::new(OfflineGenerator)
        };

        let editing = EditingUseCase::new(
            Arc::new(documents),
            Arc::new(sessions),
            generator,
            config.engine,
        );

        Ok(Self { editing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::document::DocumentKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_offline_app_persists_documents() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RedraftPaths::new(Some(temp_dir.path().to_path_buf()));

        let doc = App::open(&paths, false)
            .unwrap()
            .editing
            .create_document(DocumentKind::AnalysisSummary, "Persisted.")
            .await
            .unwrap();

        let reopened = App::open(&paths, false).unwrap();
        assert_eq!(
            reopened.editing.get_document(&doc.id).await.unwrap().current_text,
            "Persisted."
        );
        assert!(temp_dir.path().join("documents").join(format!("{}.toml", doc.id)).exists());
    }

    #[tokio::test]
    async fn test_offline_generator_refuses() {
        let err = OfflineGenerator
            .generate(GenerationRequest::new("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, RedraftError::Config(_)));
    }
}
