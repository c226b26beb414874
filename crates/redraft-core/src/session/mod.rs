//! Session domain module.
//!
//! This module contains the editing-conversation domain models, the
//! suggestion types and events, and the repository interface.
//!
//! # Module Structure
//!
//! - `model`: `ChatSession` and its `SessionState`
//! - `message`: Conversation message types (`MessageRole`, `Message`)
//! - `suggestion`: `EditSuggestion`, `SuggestionStatus`, `SuggestionDraft`
//! - `event`: `SuggestionEvent` and the subscriber-facing `PendingState`
//! - `repository`: Repository trait for session persistence

mod event;
mod message;
mod model;
mod repository;
mod suggestion;

pub use event::{PendingState, SuggestionEvent};
pub use message::{Message, MessageRole};
pub use model::{ChatSession, SessionState};
pub use repository::SessionRepository;
pub use suggestion::{EditSuggestion, SuggestionDraft, SuggestionStatus};
