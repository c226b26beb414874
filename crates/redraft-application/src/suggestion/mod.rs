//! Suggestion lifecycle and the shared edit gateway.
//!
//! - `manager`: per-session state machine (`SuggestionLifecycleManager`)
//! - `gateway`: idempotent apply/reject shared by every UI surface (`EditGateway`)

mod gateway;
mod manager;

pub use gateway::EditGateway;
pub use manager::{AppliedEdit, SuggestionLifecycleManager, SuggestionPreview};
