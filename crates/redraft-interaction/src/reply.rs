//! Parsing of the model's reply text.
//!
//! The system prompt asks for a JSON object:
//!
//! ```json
//! {"message": "...", "edit_suggestion": {"new_value": "...", "reason": "..."}}
//! ```
//!
//! Models do not always comply. Fenced JSON and JSON surrounded by prose are
//! accepted; anything else is treated as a plain message with no suggestion.

use redraft_core::generation::GenerationReply;
use redraft_core::session::SuggestionDraft;
use serde::Deserialize;

#[derive(Deserialize)]
struct RawReply {
    message: String,
    #[serde(default, alias = "editSuggestion")]
    edit_suggestion: Option<RawSuggestion>,
}

#[derive(Deserialize)]
struct RawSuggestion {
    #[serde(default, alias = "newValue")]
    new_value: Option<String>,
    #[serde(default)]
    reason: String,
}

pub fn parse_reply(text: &str) -> GenerationReply {
    let trimmed = text.trim();

    for candidate in [Some(strip_fence(trimmed)), outermost_object(trimmed)]
        .into_iter()
        .flatten()
    {
        if let Ok(raw) = serde_json::from_str::<RawReply>(candidate) {
            return GenerationReply {
                message: raw.message,
                edit_suggestion: raw.edit_suggestion.map(|s| SuggestionDraft {
                    new_value: s.new_value,
                    reason: s.reason,
                }),
            };
        }
    }

    tracing::debug!("[parse_reply] Reply is not JSON; treating it as plain text");
    GenerationReply::text(trimmed)
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
