//! Infrastructure layer for Redraft.
//!
//! Persistence backends for documents and sessions (in-memory and TOML files),
//! path resolution and configuration loading.

pub mod config_service;
pub mod memory;
pub mod paths;
pub mod storage;
pub mod toml_document_repository;
pub mod toml_session_repository;

pub use config_service::ConfigService;
pub use memory::{InMemoryDocumentRepository, InMemorySessionRepository};
pub use paths::RedraftPaths;
pub use toml_document_repository::TomlDocumentRepository;
pub use toml_session_repository::TomlSessionRepository;
