// HTTP request handlers

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::stream::{into_body, CONTENT_TYPE, DATA_STREAM_HEADER};
use super::ChatServer;
use crate::config::StreamProtocol;
use crate::providers::{keys, Provider};

/// Create the main application router
pub fn create_router(server: Arc<ChatServer>) -> Router {
    Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/api/providers", get(list_providers))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server)
}

/// Handle POST /api/chat
///
/// The body is taken as raw bytes so that JSON errors are reported in the
/// same error shape as every other rejection.
pub async fn handle_chat(State(server): State<Arc<ChatServer>>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("chat", request_id = %request_id);

    async move {
        let protocol = server.config().server.stream_protocol;

        let mut response = match server.service().handle_chat_request(&body).await {
            Ok(stream) => {
                let provider = stream.provider.as_str();
                server.metrics().record_outcome(provider, "ok");

                let model = stream.model.clone();
                let chunks_sent = server.metrics().chunk_counter(provider);
                let body = into_body(stream, protocol, chunks_sent, request_id.clone());

                let mut response = body.into_response();
                let headers = response.headers_mut();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE));
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
                if protocol == StreamProtocol::Data {
                    headers.insert(DATA_STREAM_HEADER, HeaderValue::from_static("v1"));
                }
                headers.insert("x-sahiti-provider", HeaderValue::from_static(provider));
                insert_header(headers, "x-sahiti-model", &model);
                response
            }
            Err(err) => {
                let provider = err.provider().map(|p| p.as_str()).unwrap_or("unknown");
                server.metrics().record_outcome(provider, err.outcome_label());
                err.into_response()
            }
        };

        insert_header(response.headers_mut(), "x-request-id", &request_id);
        response
    }
    .instrument(span)
    .await
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(HeaderName::from_static(name), value);
    }
}

/// One row of GET /api/providers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: Provider,
    pub name: &'static str,
    pub requires_api_key: bool,
    /// Usable with server configuration alone
    pub available: bool,
    pub default_model: String,
    pub key_url: &'static str,
}

/// Handle GET /api/providers
pub async fn list_providers(State(server): State<Arc<ChatServer>>) -> Json<Vec<ProviderInfo>> {
    let config = server.config();
    let usable = config.usable_server_providers();

    let providers = Provider::ALL
        .into_iter()
        .map(|provider| ProviderInfo {
            id: provider,
            name: provider.display_name(),
            requires_api_key: provider.requires_client_key(),
            available: usable.contains(&provider),
            default_model: config.models.default_model(provider).to_string(),
            key_url: keys::key_issuance_url(provider),
        })
        .collect();

    Json(providers)
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub providers_available: Vec<Provider>,
}

/// Handle GET /health
pub async fn health_check(State(server): State<Arc<ChatServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: server.uptime().as_secs(),
        providers_available: server.config().usable_server_providers(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint(State(server): State<Arc<ChatServer>>) -> Response {
    match server.metrics().render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
