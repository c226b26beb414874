//! Application layer for Redraft.
//!
//! Use cases that coordinate the domain and the persistence backends: the
//! version store, the suggestion lifecycle, the shared edit gateway and the
//! event bus that keeps every surface in sync.

pub mod editing_usecase;
pub mod event_bus;
pub mod suggestion;
pub mod version_store;

pub use editing_usecase::EditingUseCase;
pub use event_bus::SuggestionBus;
pub use suggestion::{AppliedEdit, EditGateway, SuggestionLifecycleManager, SuggestionPreview};
pub use version_store::VersionStore;
