//! Document domain module.
//!
//! # Module Structure
//!
//! - `model`: `Document`, `Version`, `DocumentHistory` and their enums
//! - `repository`: `DocumentRepository`, the persistence collaborator for documents and versions

mod model;
mod repository;

pub use model::{Document, DocumentHistory, DocumentKind, EditedBy, NewVersion, Version};
pub use repository::DocumentRepository;
