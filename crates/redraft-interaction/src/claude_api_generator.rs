//! ClaudeApiGenerator - text generation through the Claude Messages API.
//!
//! Configuration: `ANTHROPIC_API_KEY` is required; the model comes from
//! `REDRAFT_MODEL`, then `[generator].model` in config.toml, then the default.

use crate::reply::parse_reply;
use async_trait::async_trait;
use redraft_core::config::GeneratorConfig;
use redraft_core::generation::{GenerationReply, GenerationRequest, TextGenerator};
use redraft_core::session::{Message, MessageRole};
use redraft_core::{RedraftError, Result};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = r#"You help a user revise a short generated document.
The current document text is given inside <document> tags, followed by the user's instruction.

Always answer with a single JSON object and nothing else:
{"message": "<your reply to the user>", "edit_suggestion": {"new_value": "<the complete revised document>", "reason": "<one short sentence>"}}

Omit "edit_suggestion" when you are not proposing a change. "new_value" must be the whole document, not a fragment."#;

/// Text generator backed by the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    max_retries: u32,
    initial_backoff: Duration,
}

impl ClaudeApiGenerator {
    /// Creates a generator with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = GeneratorConfig::default();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
            max_tokens: defaults.max_tokens,
            max_retries: defaults.max_retries,
            initial_backoff: Duration::from_millis(defaults.initial_backoff_ms),
        }
    }

    /// Loads the API key from the environment and applies `config`.
    pub fn try_from_env(config: &GeneratorConfig) -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| RedraftError::config("ANTHROPIC_API_KEY is not set"))?;

        let model = env::var("REDRAFT_MODEL")
            .ok()
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string());

        Ok(Self::new(api_key, model).with_config(config))
    }

    pub fn with_config(mut self, config: &GeneratorConfig) -> Self {
        self.max_tokens = config.max_tokens;
        self.max_retries = config.max_retries;
        self.initial_backoff = Duration::from_millis(config.initial_backoff_ms);
        self
    }

    /// Points the generator at a different endpoint (a proxy or a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &GenerationRequest) -> CreateMessageRequest {
        let mut messages: Vec<ApiMessage> = Vec::new();

        for message in &request.history {
            push_turn(&mut messages, api_role(message), history_text(message));
        }
        push_turn(
            &mut messages,
            "user",
            format!(
                "<document>\n{}\n</document>\n\n{}",
                request.document_text, request.instruction
            ),
        );

        // The API requires the conversation to open with a user turn.
        let first_user = messages
            .iter()
            .position(|m| m.role == "user")
            .unwrap_or(0);
        messages.drain(..first_user);

        CreateMessageRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            system: Some(SYSTEM_PROMPT.to_string()),
        }
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> std::result::Result<String, RequestFailure> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| RequestFailure {
                status_code: None,
                message: format!("Claude API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
                retry_after: None,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| RequestFailure {
            status_code: None,
            message: format!("Failed to parse Claude response: {err}"),
            is_retryable: false,
            retry_after: None,
        })?;

        extract_text_response(parsed)
    }

    /// Delay before retry number `attempt` (1-based).
    fn backoff(&self, attempt: u32, failure: &RequestFailure) -> Duration {
        failure
            .retry_after
            .unwrap_or_else(|| self.initial_backoff * 2u32.saturating_pow(attempt - 1))
    }
}

#[async_trait]
impl TextGenerator for ClaudeApiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply> {
        let body = self.build_request(&request);

        let mut attempt = 0;
        loop {
            match self.send_request(&body).await {
                Ok(text) => return Ok(parse_reply(&text)),
                Err(failure) if failure.is_retryable && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt, &failure);
                    tracing::warn!(
                        "[ClaudeApiGenerator] {} (status {:?}); retry {}/{} in {:?}",
                        failure.message,
                        failure.status_code,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => {
                    tracing::error!("[ClaudeApiGenerator] {}", failure.message);
                    return Err(failure.into());
                }
            }
        }
    }
}

/// A failed round-trip, before it is folded into `RedraftError::Upstream`.
#[derive(Debug, Clone, PartialEq)]
struct RequestFailure {
    status_code: Option<u16>,
    message: String,
    is_retryable: bool,
    retry_after: Option<Duration>,
}

impl From<RequestFailure> for RedraftError {
    fn from(failure: RequestFailure) -> Self {
        match failure.status_code {
            Some(status) => RedraftError::upstream(format!("{} (HTTP {})", failure.message, status)),
            None => RedraftError::upstream(failure.message),
        }
    }
}

fn api_role(message: &Message) -> &'static str {
    match message.role {
        MessageRole::User => "user",
        MessageRole::Model => "assistant",
    }
}

/// Past model turns are replayed with their proposals so the model can refer
/// back to them.
fn history_text(message: &Message) -> String {
    match &message.edit_suggestion {
        Some(suggestion) => format!(
            "{}\n\n[Proposed revision ({}): {}]",
            message.content, suggestion.status, suggestion.new_value
        ),
        None => message.content.clone(),
    }
}

/// Appends a turn, merging it into the previous one if the role repeats.
fn push_turn(messages: &mut Vec<ApiMessage>, role: &'static str, text: String) {
    if let Some(last) = messages.last_mut() {
        if last.role == role {
            last.content.push(ContentBlock::Text { text });
            return;
        }
    }
    messages.push(ApiMessage {
        role,
        content: vec![ContentBlock::Text { text }],
    });
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> std::result::Result<String, RequestFailure> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .ok_or_else(|| RequestFailure {
            status_code: None,
            message: "Claude API returned no text in the response content".to_string(),
            is_retryable: false,
            retry_after: None,
        })
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> RequestFailure {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    // 529 is Anthropic's "overloaded".
    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    ) || status.as_u16() == 529;

    RequestFailure {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are ignored; exponential backoff applies instead.
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
