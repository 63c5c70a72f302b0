// Gemini API provider implementation
//
// Uses the `streamGenerateContent` endpoint with `alt=sse`, which emits one
// GenerateContentResponse JSON object per `data:` line.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::sse::{spawn_pump, SseEvent};
use super::types::{CompletionRequest, StreamChunk};
use super::LlmProvider;
use crate::chat::Role;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini provider
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            default_model: "gemini-2.0-flash".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }

    /// Convert CompletionRequest to Gemini's format
    ///
    /// Gemini has no system role inside `contents`; system messages from the
    /// history are appended to the system instruction instead.
    fn to_gemini_request(&self, request: &CompletionRequest) -> GeminiRequest {
        let mut system_parts = vec![GeminiPart {
            text: request.system_prompt.clone(),
        }];
        let mut contents = Vec::with_capacity(request.messages.len());

        for msg in &request.messages {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
                Role::System => {
                    system_parts.push(GeminiPart {
                        text: msg.content.clone(),
                    });
                    continue;
                }
            };
            contents.push(GeminiContent {
                role: role.to_string(),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            });
        }

        GeminiRequest {
            contents,
            system_instruction: GeminiSystemInstruction {
                parts: system_parts,
            },
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

fn parse_stream_payload(payload: &str) -> Result<SseEvent> {
    let response: GeminiStreamResponse = match serde_json::from_str(payload) {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Skipping unparseable Gemini payload: {}", e);
            return Ok(SseEvent::Chunks(Vec::new()));
        }
    };

    if let Some(error) = response.error {
        return Err(anyhow!("Gemini stream error: {}", error.message));
    }

    let mut chunks = Vec::new();
    if let Some(candidate) = response.candidates.into_iter().next() {
        if let Some(content) = candidate.content {
            for part in content.parts {
                if let Some(text) = part.text {
                    if !text.is_empty() {
                        chunks.push(StreamChunk::TextDelta(text));
                    }
                }
            }
        }
        if let Some(reason) = candidate.finish_reason {
            chunks.push(StreamChunk::Finished {
                reason: Some(reason),
            });
        }
    }
    Ok(SseEvent::Chunks(chunks))
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn stream_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let model = request.model_or(&self.default_model);
        let body = self.to_gemini_request(request);

        tracing::debug!(provider = "gemini", model, "Sending streaming request");

        let response = self
            .client
            .post(self.stream_url(model))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send streaming request to Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "gemini API streaming request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        Ok(spawn_pump("gemini", response, parse_stream_payload))
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiSystemInstruction,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
