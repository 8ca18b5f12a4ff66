//! Remote chat-completion service.

pub mod client;

pub use client::OpenAiCompatClient;

use crate::tools::ToolDescriptor;
use crate::types::{ChatMessage, InferenceResponse};
use anyhow::Result;
use async_trait::async_trait;

/// One request to the model service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Tool catalog offered to the model. Empty means no tools are sent.
    pub tools: Vec<ToolDescriptor>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// A chat-completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;

    /// Run one completion. Either free text, tool calls, or both come back.
    async fn complete(&self, request: CompletionRequest) -> Result<InferenceResponse>;
}
