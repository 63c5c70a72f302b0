// OpenAI API provider implementation
//
// This provider works for both OpenAI and Groq since Groq serves an
// OpenAI-compatible chat completions API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::sse::{spawn_pump, SseEvent};
use super::types::{CompletionRequest, StreamChunk};
use super::LlmProvider;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai";

/// OpenAI API provider
///
/// Supports both OpenAI and Groq APIs (they use the same format).
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    provider_name: &'static str,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new_openai(client: Client, api_key: impl Into<String>) -> Self {
        Self::new(client, api_key.into(), OPENAI_BASE_URL, "gpt-4o-mini", "openai")
    }

    /// Create a new Groq provider (uses OpenAI-compatible API)
    pub fn new_groq(client: Client, api_key: impl Into<String>) -> Self {
        Self::new(
            client,
            api_key.into(),
            GROQ_BASE_URL,
            "llama-3.1-8b-instant",
            "groq",
        )
    }

    fn new(
        client: Client,
        api_key: String,
        base_url: &str,
        default_model: &str,
        provider_name: &'static str,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.to_string(),
            default_model: default_model.to_string(),
            provider_name,
        }
    }

    /// Point the provider at a different host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create with custom default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Convert CompletionRequest to OpenAI API format
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: request.system_prompt.clone(),
        });
        messages.extend(request.messages.iter().map(|msg| OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }));

        OpenAIRequest {
            model: request.model_or(&self.default_model).to_string(),
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            stream: true,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

/// Parse one `data:` payload of an OpenAI-style stream
fn parse_stream_payload(payload: &str) -> Result<SseEvent> {
    if payload == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: OpenAIStreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!("Skipping unparseable stream payload: {}", e);
            return Ok(SseEvent::Chunks(Vec::new()));
        }
    };

    if let Some(error) = chunk.error {
        return Err(anyhow!("Stream error from provider: {}", error.message));
    }

    let mut chunks = Vec::new();
    if let Some(choice) = chunk.choices.into_iter().next() {
        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                chunks.push(StreamChunk::TextDelta(content));
            }
        }
        if let Some(reason) = choice.finish_reason {
            chunks.push(StreamChunk::Finished {
                reason: Some(reason),
            });
        }
    }
    Ok(SseEvent::Chunks(chunks))
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn stream_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let openai_request = self.to_openai_request(request);

        tracing::debug!(
            provider = self.provider_name,
            model = %openai_request.model,
            messages = openai_request.messages.len(),
            "Sending streaming request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .with_context(|| {
                format!("Failed to send streaming request to {} API", self.provider_name)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "{} API streaming request failed\n\nStatus: {}\nBody: {}",
                self.provider_name,
                status,
                error_body
            );
        }

        Ok(spawn_pump(self.provider_name, response, parse_stream_payload))
    }

    fn name(&self) -> &str {
        self.provider_name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// OpenAI API types

#[derive(Debug, Clone, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

// Streaming types

#[derive(Debug, Clone, Deserialize)]
struct OpenAIStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    error: Option<OpenAIError>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: OpenAIDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OpenAIDelta {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIError {
    message: String,
}
