// Provider factory
//
// Creates LLM providers for a resolved provider tag and credential. The chat
// service only talks to this trait, so tests can swap in a fake.

use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

use super::claude::ClaudeProvider;
use super::gemini::GeminiProvider;
use super::openai::OpenAIProvider;
use super::{http_client, LlmProvider, Provider};
use crate::config::{Config, ProvidersConfig};
use crate::router::ModelTable;

/// Builds an adapter for one request
pub trait ProviderFactory: Send + Sync {
    fn create(&self, provider: Provider, api_key: &str) -> Result<Box<dyn LlmProvider>>;
}

/// Factory for the real vendor HTTP adapters
///
/// Holds one connection pool shared by every request; credentials are only
/// ever passed per call.
pub struct HttpProviderFactory {
    client: Client,
    providers: ProvidersConfig,
    models: ModelTable,
}

impl HttpProviderFactory {
    pub fn new(config: &Config) -> Result<Self> {
        let client = http_client(Duration::from_secs(config.server.max_duration_secs))?;
        Ok(Self {
            client,
            providers: config.providers.clone(),
            models: config.models.clone(),
        })
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(&self, provider: Provider, api_key: &str) -> Result<Box<dyn LlmProvider>> {
        let client = self.client.clone();
        let base_url = self.providers.get(provider).base_url.clone();
        let model = self.models.default_model(provider).to_string();

        let adapter: Box<dyn LlmProvider> = match provider {
            Provider::Groq => {
                let mut adapter = OpenAIProvider::new_groq(client, api_key).with_model(model);
                if let Some(url) = base_url {
                    adapter = adapter.with_base_url(url);
                }
                Box::new(adapter)
            }
            Provider::OpenAI => {
                let mut adapter = OpenAIProvider::new_openai(client, api_key).with_model(model);
                if let Some(url) = base_url {
                    adapter = adapter.with_base_url(url);
                }
                Box::new(adapter)
            }
            Provider::Gemini => {
                let mut adapter = GeminiProvider::new(client, api_key).with_model(model);
                if let Some(url) = base_url {
                    adapter = adapter.with_base_url(url);
                }
                Box::new(adapter)
            }
            Provider::Claude => {
                let mut adapter = ClaudeProvider::new(client, api_key).with_model(model);
                if let Some(url) = base_url {
                    adapter = adapter.with_base_url(url);
                }
                Box::new(adapter)
            }
        };

        Ok(adapter)
    }
}
