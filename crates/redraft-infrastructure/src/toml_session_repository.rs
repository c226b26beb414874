//! TOML-based session repository.
//!
//! Sessions are stored as `sessions/<id>.toml`, one file per session, rewritten
//! atomically on every save.

use crate::storage::{AtomicTomlFile, RecordDir, run_blocking};
use async_trait::async_trait;
use redraft_core::Result;
use redraft_core::session::{ChatSession, SessionRepository};
use std::path::PathBuf;

pub struct TomlSessionRepository {
    dir: RecordDir,
}

impl TomlSessionRepository {
    /// Creates a repository rooted at `sessions_dir`, creating it if needed.
    pub fn new(sessions_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            dir: RecordDir::open(sessions_dir)?,
        })
    }

    fn session_file(&self, session_id: &str) -> Result<AtomicTomlFile<ChatSession>> {
        self.dir.file(session_id)
    }
}

#[async_trait]
impl SessionRepository for TomlSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<ChatSession>> {
        let file = self.session_file(session_id)?;
        run_blocking(move || Ok(file.load()?)).await
    }

    async fn save(&self, session: &ChatSession) -> Result<()> {
        let file = self.session_file(&session.id)?;
        let session = session.clone();
        run_blocking(move || Ok(file.save(&session)?)).await
    }

    async fn find_by_suggestion(&self, suggestion_id: &str) -> Result<Option<ChatSession>> {
        let dir = self.dir.clone();
        let sessions: Vec<ChatSession> = run_blocking(move || dir.load_all()).await?;

        Ok(sessions
            .into_iter()
            .find(|s| s.find_suggestion(suggestion_id).is_some()))
    }
}
