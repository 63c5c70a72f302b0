// Multi-provider LLM support
//
// This module provides an abstraction layer over the hosted LLM providers
// (Groq, Gemini, OpenAI, Claude) so the chat service can stream a completion
// from any of them through one interface.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;

pub mod keys;
pub(crate) mod sse;
pub mod types;

// Provider implementations
pub mod claude;
pub mod gemini;
pub mod openai;

// Provider factory
pub mod factory;

// Re-export commonly used types
pub use factory::{HttpProviderFactory, ProviderFactory};
pub use types::{CompletionRequest, StreamChunk};

/// Hosted backend a chat request can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    Gemini,
    #[serde(rename = "openai")]
    OpenAI,
    Claude,
}

/// Where a provider's credential comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read from server configuration (environment / config file)
    Server,
    /// Supplied by the client with each request
    Client,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Groq,
        Provider::Gemini,
        Provider::OpenAI,
        Provider::Claude,
    ];

    /// Wire name ("groq", "gemini", "openai", "claude")
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
            Provider::Claude => "claude",
        }
    }

    /// Human-readable name for error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::Gemini => "Gemini",
            Provider::OpenAI => "OpenAI",
            Provider::Claude => "Claude",
        }
    }

    pub fn credential_source(&self) -> CredentialSource {
        match self {
            Provider::Groq | Provider::Gemini => CredentialSource::Server,
            Provider::OpenAI | Provider::Claude => CredentialSource::Client,
        }
    }

    pub fn requires_client_key(&self) -> bool {
        self.credential_source() == CredentialSource::Client
    }

    /// Environment variable holding the server-side key, if any
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Gemini => Some("GOOGLE_GENERATIVE_AI_API_KEY"),
            Provider::OpenAI | Provider::Claude => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a provider name matches none of the known adapters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "claude" => Ok(Provider::Claude),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Trait for LLM providers
///
/// Every hosted backend implements this trait. The returned channel yields
/// chunks in the order the vendor produced them and is closed once the
/// vendor stream ends. It cannot be restarted.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Start a streaming completion
    ///
    /// Resolves only after the vendor has accepted the request, so a failed
    /// call surfaces here rather than as the first item on the channel.
    async fn stream_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<Receiver<Result<StreamChunk>>>;

    /// Get the provider name (e.g., "groq", "claude")
    fn name(&self) -> &str;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;
}

/// Build the HTTP client shared by all adapters
///
/// `max_duration` bounds the whole upstream call, streamed body included.
pub fn http_client(max_duration: Duration) -> Result<Client> {
    Client::builder()
        .timeout(max_duration)
        .build()
        .context("Failed to create HTTP client")
}
