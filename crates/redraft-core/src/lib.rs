//! Domain layer for Redraft.
//!
//! Holds the models shared by every layer (documents, versions, chat
//! sessions, edit suggestions), the word-level diff engine, the error
//! taxonomy and the traits of the external collaborators (persistence and
//! text generation).

pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod generation;
pub mod session;

// Re-export common error type
pub use error::{RedraftError, Result};
