//! Session repository trait.
//!
//! Defines the interface for chat session persistence operations.

use super::model::ChatSession;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing chat session persistence.
///
/// Decouples the lifecycle manager from the storage mechanism (memory, TOML
/// files, a remote API). The manager keeps live sessions in memory and saves
/// the full session after every change.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ChatSession))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<ChatSession>>;

    /// Saves a session, replacing any stored copy.
    async fn save(&self, session: &ChatSession) -> Result<()>;

    /// Finds the session whose messages carry the given suggestion.
    ///
    /// Used when a suggestion is resolved by ID alone and its session has not
    /// been loaded in this process.
    async fn find_by_suggestion(&self, suggestion_id: &str) -> Result<Option<ChatSession>>;
}
