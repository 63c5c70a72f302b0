// Chat request errors
//
// Every way a chat request can fail before its stream starts, each mapped to
// an HTTP status and a JSON body the browser client knows how to render.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::providers::{keys, Provider};

/// Lower-cased fragments that mark an upstream failure as a credential problem
const AUTH_MARKERS: [&str; 5] = [
    "invalid api key",
    "401",
    "authentication",
    "unauthorized",
    "api key not valid",
];

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Body is not JSON, or messages is missing or empty
    #[error("{0}")]
    MalformedRequest(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Valid {} API key required", provider.display_name())]
    CredentialMissingOrInvalid {
        provider: Provider,
        available: Vec<Provider>,
    },

    #[error("Invalid {} API key", provider.display_name())]
    UpstreamAuthFailure { provider: Provider, details: String },

    #[error("Failed to generate response")]
    UpstreamFailure { provider: Provider, details: String },
}

impl ChatError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ChatError::MalformedRequest(message.into())
    }

    /// Classify an error raised by a provider adapter
    pub fn from_upstream(provider: Provider, err: &anyhow::Error) -> Self {
        let details = format!("{:#}", err);
        let lowered = details.to_lowercase();

        if AUTH_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            ChatError::UpstreamAuthFailure { provider, details }
        } else {
            ChatError::UpstreamFailure { provider, details }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::MalformedRequest(_) | ChatError::UnsupportedProvider(_) => {
                StatusCode::BAD_REQUEST
            }
            ChatError::CredentialMissingOrInvalid { .. }
            | ChatError::UpstreamAuthFailure { .. } => StatusCode::UNAUTHORIZED,
            ChatError::UpstreamFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Provider the error concerns, when one was resolved
    pub fn provider(&self) -> Option<Provider> {
        match self {
            ChatError::CredentialMissingOrInvalid { provider, .. }
            | ChatError::UpstreamAuthFailure { provider, .. }
            | ChatError::UpstreamFailure { provider, .. } => Some(*provider),
            ChatError::MalformedRequest(_) | ChatError::UnsupportedProvider(_) => None,
        }
    }

    /// Label used for the request outcome metric
    pub fn outcome_label(&self) -> &'static str {
        match self {
            ChatError::MalformedRequest(_) => "malformed",
            ChatError::UnsupportedProvider(_) => "unsupported_provider",
            ChatError::CredentialMissingOrInvalid { .. } => "missing_credential",
            ChatError::UpstreamAuthFailure { .. } => "upstream_auth",
            ChatError::UpstreamFailure { .. } => "upstream_error",
        }
    }

    fn body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            error: self.to_string(),
            details: None,
            available_providers: None,
            suggested_action: None,
        };

        match self {
            ChatError::CredentialMissingOrInvalid {
                provider,
                available,
            } => {
                body.available_providers =
                    Some(available.iter().map(|p| p.as_str().to_string()).collect());
                body.suggested_action = Some(suggested_action(*provider));
            }
            ChatError::UpstreamAuthFailure { provider, details } => {
                body.details = Some(details.clone());
                body.suggested_action = Some(suggested_action(*provider));
            }
            ChatError::UpstreamFailure { details, .. } => {
                body.details = Some(details.clone());
            }
            ChatError::MalformedRequest(_) | ChatError::UnsupportedProvider(_) => {}
        }

        body
    }
}

/// Hint telling the user where a working key comes from
pub fn suggested_action(provider: Provider) -> String {
    let url = keys::key_issuance_url(provider);
    match provider.env_var() {
        Some(var) => format!(
            "Set {} on the server. Get a {} key at {}",
            var,
            provider.display_name(),
            url
        ),
        None => format!(
            "Enter your {} API key in settings. Get one at {}",
            provider.display_name(),
            url
        ),
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "availableProviders", skip_serializing_if = "Option::is_none")]
    pub available_providers: Option<Vec<String>>,
    #[serde(rename = "suggestedAction", skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, provider = ?self.provider(), "Chat request failed");
        } else {
            tracing::warn!(error = %self, provider = ?self.provider(), "Chat request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
