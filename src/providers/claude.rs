// Claude API provider implementation

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::sse::{spawn_pump, SseEvent};
use super::types::{CompletionRequest, StreamChunk};
use super::LlmProvider;
use crate::chat::Role;

const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API provider
///
/// Implements the LlmProvider trait for Anthropic's Messages API.
#[derive(Clone)]
pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl ClaudeProvider {
    /// Create a new Claude provider
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: CLAUDE_BASE_URL.to_string(),
            default_model: "claude-sonnet-4-20250514".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create with custom default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Convert CompletionRequest to Claude's Messages format
    ///
    /// The Messages API only accepts user/assistant turns; system messages in
    /// the history are appended to the top-level system prompt.
    fn to_message_request(&self, request: &CompletionRequest) -> MessageRequest {
        let mut system = request.system_prompt.clone();
        let mut messages = Vec::with_capacity(request.messages.len());

        for msg in &request.messages {
            match msg.role {
                Role::System => {
                    system.push_str("\n\n");
                    system.push_str(&msg.content);
                }
                Role::User | Role::Assistant => messages.push(ClaudeMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        MessageRequest {
            model: request.model_or(&self.default_model).to_string(),
            max_tokens: request.max_tokens,
            system,
            messages,
            temperature: request.temperature,
            stream: true,
        }
    }
}

/// Parse one `data:` payload of a Messages API stream
fn parse_stream_payload(payload: &str) -> Result<SseEvent> {
    let event: StreamEvent = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!("Skipping unparseable Claude event: {}", e);
            return Ok(SseEvent::Chunks(Vec::new()));
        }
    };

    tracing::trace!("Stream event: {}", event.event_type);
    match event.event_type.as_str() {
        "content_block_delta" => {
            let text = event
                .delta
                .filter(|delta| delta.delta_type.as_deref() == Some("text_delta"))
                .and_then(|delta| delta.text)
                .filter(|text| !text.is_empty());
            Ok(SseEvent::Chunks(
                text.map(StreamChunk::TextDelta).into_iter().collect(),
            ))
        }
        "message_delta" => {
            let reason = event.delta.and_then(|delta| delta.stop_reason);
            Ok(SseEvent::Chunks(vec![StreamChunk::Finished { reason }]))
        }
        "message_stop" => Ok(SseEvent::Done),
        "error" => {
            let detail = event
                .error
                .map(|e| format!("{}: {}", e.error_type, e.message))
                .unwrap_or_else(|| "unknown error".to_string());
            Err(anyhow!("Claude stream error: {}", detail))
        }
        _ => Ok(SseEvent::Chunks(Vec::new())),
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn stream_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let msg_request = self.to_message_request(request);

        tracing::debug!(
            provider = "claude",
            model = %msg_request.model,
            messages = msg_request.messages.len(),
            "Sending streaming request"
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&msg_request)
            .send()
            .await
            .context("Failed to send streaming request to Claude API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "claude API streaming request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        Ok(spawn_pump("claude", response, parse_stream_payload))
    }

    fn name(&self) -> &str {
        "claude"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// Claude API types

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ClaudeMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

/// Server-Sent Event from Claude API
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<StreamDelta>,
    error: Option<StreamError>,
}

/// Delta within a streaming event
#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(rename = "type")]
    delta_type: Option<String>,
    text: Option<String>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}
