#![allow(dead_code)]

use async_trait::async_trait;
use redraft_application::EditingUseCase;
use redraft_core::config::EngineConfig;
use redraft_core::generation::{GenerationReply, GenerationRequest, TextGenerator};
use redraft_core::{RedraftError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const GUARD_TEXT: &str = "The guard is strong.";
pub const GUARD_REVISION: &str = "The guard is strong and mobile.";

/// Replies from a queue and records every request.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<GenerationReply>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<GenerationReply>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RedraftError::upstream("script exhausted")))
    }
}

/// Never answers within any reasonable timeout.
pub struct SlowGenerator(pub Duration);

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationReply> {
        tokio::time::sleep(self.0).await;
        Ok(GenerationReply::text("too late"))
    }
}

/// Signals `started`, then holds its reply until `release` is notified.
pub struct GatedGenerator {
    pub started: Notify,
    pub release: Notify,
    reply: GenerationReply,
}

impl GatedGenerator {
    pub fn new(reply: GenerationReply) -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            reply,
        })
    }
}

#[async_trait]
impl TextGenerator for GatedGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationReply> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.reply.clone())
    }
}

pub fn guard_reply() -> GenerationReply {
    GenerationReply::with_suggestion(
        "Here is a revision that mentions mobility.",
        GUARD_REVISION,
        "Mention mobility",
    )
}

pub fn use_case(generator: Arc<dyn TextGenerator>) -> EditingUseCase {
    EditingUseCase::in_memory(generator, EngineConfig::default())
}
