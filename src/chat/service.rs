// Chat request handling
//
// One request runs ParseBody -> ValidateMessages -> ResolvePersonaAndModel
// -> ValidateCredential -> Dispatch. Nothing here is shared mutably between
// requests: config is read-only and every request builds its own adapter.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

use super::{last_user_text, resolve_prompt, ChatRequest, Mode};
use crate::config::Config;
use crate::errors::ChatError;
use crate::providers::{
    keys, CompletionRequest, HttpProviderFactory, Provider, ProviderFactory, StreamChunk,
};
use crate::router::ModelTier;

/// Provider used when the request does not name one
pub const DEFAULT_PROVIDER: Provider = Provider::Groq;

/// A dispatched completion, ready to be streamed to the client
pub struct ChatStream {
    pub provider: Provider,
    pub mode: Mode,
    pub tier: ModelTier,
    pub model: String,
    pub temperature: f32,
    /// Chunks in vendor order; closed when the vendor stream ends
    pub chunks: Receiver<Result<StreamChunk>>,
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("provider", &self.provider)
            .field("mode", &self.mode)
            .field("tier", &self.tier)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

/// Stateless chat request handler
#[derive(Clone)]
pub struct ChatService {
    config: Arc<Config>,
    factory: Arc<dyn ProviderFactory>,
}

impl ChatService {
    /// Service backed by the real vendor adapters
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let factory = HttpProviderFactory::new(&config)?;
        Ok(Self::with_factory(config, Arc::new(factory)))
    }

    /// Service with a caller-supplied adapter factory
    pub fn with_factory(config: Arc<Config>, factory: Arc<dyn ProviderFactory>) -> Self {
        Self { config, factory }
    }

    /// Handle a raw POST /api/chat body
    pub async fn handle_chat_request(&self, raw: &[u8]) -> Result<ChatStream, ChatError> {
        let request: ChatRequest = serde_json::from_slice(raw).map_err(|e| {
            tracing::debug!(error = %e, "Rejecting unparseable chat body");
            ChatError::malformed(format!("Invalid request body: {}", e))
        })?;

        self.handle(request).await
    }

    /// Handle an already-parsed request
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatStream, ChatError> {
        let messages = match request.messages {
            Some(messages) if !messages.is_empty() => messages,
            _ => return Err(ChatError::malformed("Messages array is required")),
        };

        let provider = match request.provider.as_deref() {
            None => DEFAULT_PROVIDER,
            Some(name) => name
                .parse::<Provider>()
                .map_err(|e| ChatError::UnsupportedProvider(e.0))?,
        };
        let mode = Mode::resolve(request.mode.as_deref());

        let (tier, model) = self
            .config
            .models
            .select(provider, last_user_text(&messages));
        let model = model.to_string();
        let temperature = self.config.sampling.temperature.temperature_for(mode, tier);

        let api_key = self.resolve_credential(provider, request.api_key.as_deref())?;

        tracing::info!(
            provider = %provider,
            mode = %mode,
            tier = %tier,
            model = %model,
            temperature,
            messages = messages.len(),
            "Dispatching chat request"
        );

        let completion = CompletionRequest::new(resolve_prompt(mode), messages)
            .with_model(model.clone())
            .with_temperature(temperature)
            .with_max_tokens(self.config.sampling.max_tokens);

        let adapter = self
            .factory
            .create(provider, &api_key)
            .map_err(|e| ChatError::from_upstream(provider, &e))?;

        let chunks = adapter
            .stream_completion(&completion)
            .await
            .map_err(|e| ChatError::from_upstream(provider, &e))?;

        Ok(ChatStream {
            provider,
            mode,
            tier,
            model,
            temperature,
            chunks,
        })
    }

    /// Pick the credential for `provider` and check its format
    pub fn resolve_credential(
        &self,
        provider: Provider,
        client_key: Option<&str>,
    ) -> Result<String, ChatError> {
        match self.config.credential_for(provider, client_key) {
            Some(key) if keys::is_valid(Some(key), provider) => Ok(key.to_string()),
            _ => Err(ChatError::CredentialMissingOrInvalid {
                provider,
                available: self.config.available_providers(client_key),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LlmProvider;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn stream_completion(
            &self,
            request: &CompletionRequest,
        ) -> Result<Receiver<Result<StreamChunk>>> {
            let (tx, rx) = mpsc::channel(4);
            tx.send(Ok(StreamChunk::TextDelta(request.model.clone())))
                .await
                .ok();
            Ok(rx)
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn default_model(&self) -> &str {
            "echo-1"
        }
    }

    struct EchoFactory;

    impl ProviderFactory for EchoFactory {
        fn create(&self, _provider: Provider, _api_key: &str) -> Result<Box<dyn LlmProvider>> {
            Ok(Box::new(EchoProvider))
        }
    }

    fn service(config: Config) -> ChatService {
        ChatService::with_factory(Arc::new(config), Arc::new(EchoFactory))
    }

    #[test]
    fn test_rejection_lists_available_providers() {
        let svc = service(Config::default().with_api_key(Provider::Gemini, "AIzaSyabc"));

        match svc.resolve_credential(Provider::Claude, Some("sk-ant")) {
            Err(ChatError::CredentialMissingOrInvalid { available, .. }) => {
                // "sk-ant" is too short for claude but satisfies the openai prefix rule
                assert_eq!(available, vec![Provider::Gemini, Provider::OpenAI]);
            }
            other => panic!("expected CredentialMissingOrInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_key_with_trailing_newline_rejected() {
        let svc = service(Config::default());
        let err = svc
            .resolve_credential(Provider::OpenAI, Some("sk-abc\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::CredentialMissingOrInvalid {
                provider: Provider::OpenAI,
                ..
            }
        ));
    }

    #[test]
    fn test_server_key_ignores_client_key() {
        let svc = service(Config::default());
        let err = svc
            .resolve_credential(Provider::Groq, Some("gsk_from_client"))
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::CredentialMissingOrInvalid {
                provider: Provider::Groq,
                ..
            }
        ));
    }

    #[test]
    fn test_client_key_ignores_server_key() {
        let svc = service(Config::default().with_api_key(Provider::OpenAI, "sk-server"));
        assert!(svc.resolve_credential(Provider::OpenAI, None).is_err());
        assert_eq!(
            svc.resolve_credential(Provider::OpenAI, Some("sk-client")).unwrap(),
            "sk-client"
        );
    }

    #[tokio::test]
    async fn test_selection_flows_into_request() {
        let svc = service(Config::default().with_api_key(Provider::Groq, "gsk_test"));
        let body = br#"{"messages":[{"role":"user","content":"help me plan a story"}],"mode":"bff"}"#;

        let mut stream = svc.handle_chat_request(body).await.unwrap();
        assert_eq!(stream.provider, Provider::Groq);
        assert_eq!(stream.mode, Mode::Bff);
        assert_eq!(stream.tier, ModelTier::Creative);
        assert_eq!(stream.temperature, 0.8);

        let first = stream.chunks.recv().await.unwrap().unwrap();
        assert_eq!(first.text(), Some(stream.model.as_str()));
    }

    #[tokio::test]
    async fn test_messages_must_be_a_sequence() {
        let svc = service(Config::default().with_api_key(Provider::Groq, "gsk_test"));
        let err = svc
            .handle_chat_request(br#"{"messages":"hello"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MalformedRequest(_)));
    }
}
