// Unified request/stream types for multi-provider LLM support
//
// Each adapter transforms a CompletionRequest into its vendor's wire format
// and reports progress as StreamChunk values.

use serde::Serialize;

use crate::chat::ChatMessage;

/// Unified completion request for all LLM providers
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Persona system prompt
    pub system_prompt: String,

    /// Conversation history, passed through in client order
    pub messages: Vec<ChatMessage>,

    /// Model name (provider-specific, empty means provider default)
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a new request from a system prompt and history
    pub fn new(system_prompt: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            model: String::new(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Model to send, falling back to the provider default
    pub fn model_or<'a>(&'a self, default_model: &'a str) -> &'a str {
        if self.model.is_empty() {
            default_model
        } else {
            &self.model
        }
    }
}

/// One item of a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Incremental text, forwarded to the client as-is
    TextDelta(String),
    /// Vendor signalled the end of generation
    Finished { reason: Option<String> },
}

impl StreamChunk {
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamChunk::TextDelta(text) => Some(text),
            StreamChunk::Finished { .. } => None,
        }
    }
}
