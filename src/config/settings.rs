// Configuration structs

use serde::{Deserialize, Serialize};

use crate::providers::{keys, Provider};
use crate::router::{ModelTable, TemperaturePolicy};

/// Fully resolved configuration, immutable once loaded
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub sampling: SamplingConfig,
    pub providers: ProvidersConfig,
    /// Model table with any per-provider overrides applied
    pub models: ModelTable,
}

impl Config {
    /// Set a provider's configured key (used for server-sourced providers)
    pub fn with_api_key(mut self, provider: Provider, api_key: impl Into<String>) -> Self {
        self.providers.get_mut(provider).api_key = Some(api_key.into());
        self
    }

    /// Configured key for a provider, if any
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.providers.get(provider).api_key.as_deref()
    }

    /// Key a request for `provider` would use
    ///
    /// Server-sourced providers only look at configuration; client-sourced
    /// providers only look at the request's key.
    pub fn credential_for<'a>(
        &'a self,
        provider: Provider,
        client_key: Option<&'a str>,
    ) -> Option<&'a str> {
        if provider.requires_client_key() {
            client_key
        } else {
            self.api_key(provider)
        }
    }

    /// Providers a request carrying `client_key` could use right now
    pub fn available_providers(&self, client_key: Option<&str>) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| keys::is_valid(self.credential_for(*p, client_key), *p))
            .collect()
    }

    /// Server-sourced providers whose configured key passes the format check
    pub fn usable_server_providers(&self) -> Vec<Provider> {
        self.available_providers(None)
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3000")
    pub bind_address: String,
    /// Upper bound on one upstream call, streamed body included
    pub max_duration_secs: u64,
    /// Encoding of the streamed response body
    pub stream_protocol: StreamProtocol,
    /// Allow cross-origin requests from any origin
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            max_duration_secs: 60,
            stream_protocol: StreamProtocol::Data,
            cors_permissive: true,
        }
    }
}

/// How streamed tokens are framed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamProtocol {
    /// Raw text, flushed per chunk
    Text,
    /// AI SDK data stream parts (`0:"text"\n`), what `useChat` reads by default
    #[default]
    Data,
}

/// Sampling parameters applied to every completion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: TemperaturePolicy,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: TemperaturePolicy::default(),
        }
    }
}

/// Per-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Server-side key (only consulted for groq and gemini)
    pub api_key: Option<String>,
    /// Override the vendor's API host
    pub base_url: Option<String>,
    /// Override the provider's single model
    pub model: Option<String>,
    /// Tier overrides for the tiered (groq) family
    pub fast_model: Option<String>,
    pub reasoning_model: Option<String>,
    pub creative_model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub groq: ProviderSettings,
    pub gemini: ProviderSettings,
    pub openai: ProviderSettings,
    pub claude: ProviderSettings,
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::Groq => &self.groq,
            Provider::Gemini => &self.gemini,
            Provider::OpenAI => &self.openai,
            Provider::Claude => &self.claude,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        match provider {
            Provider::Groq => &mut self.groq,
            Provider::Gemini => &mut self.gemini,
            Provider::OpenAI => &mut self.openai,
            Provider::Claude => &mut self.claude,
        }
    }

    /// Apply model overrides on top of a table
    pub fn apply_model_overrides(&self, mut table: ModelTable) -> ModelTable {
        let groq = &self.groq;
        if let Some(model) = groq.fast_model.as_ref().or(groq.model.as_ref()) {
            table.groq.fast = model.clone();
        }
        if let Some(model) = &groq.reasoning_model {
            table.groq.reasoning = model.clone();
        }
        if let Some(model) = &groq.creative_model {
            table.groq.creative = model.clone();
        }
        if let Some(model) = &self.gemini.model {
            table.gemini = model.clone();
        }
        if let Some(model) = &self.openai.model {
            table.openai = model.clone();
        }
        if let Some(model) = &self.claude.model {
            table.claude = model.clone();
        }
        table
    }
}
