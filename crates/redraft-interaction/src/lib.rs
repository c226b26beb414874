//! Text-generation backends for Redraft.
//!
//! `ClaudeApiGenerator` implements `TextGenerator` against the Claude
//! Messages API; `reply` turns the model's answer into a `GenerationReply`.

pub mod claude_api_generator;
pub mod reply;

pub use claude_api_generator::ClaudeApiGenerator;
pub use reply::parse_reply;
