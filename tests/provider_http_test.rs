// Vendor adapters against a local mock server
//
// Each test serves a canned SSE body and checks the chunks the adapter
// forwards, plus the headers it sends.

use anyhow::Result;
use mockito::Matcher;
use sahiti::chat::ChatMessage;
use sahiti::config::Config;
use sahiti::errors::ChatError;
use sahiti::providers::claude::ClaudeProvider;
use sahiti::providers::gemini::GeminiProvider;
use sahiti::providers::openai::OpenAIProvider;
use sahiti::providers::{
    http_client, CompletionRequest, HttpProviderFactory, LlmProvider, Provider, ProviderFactory,
    StreamChunk,
};
use std::io::Write;
use std::time::{Duration, Instant};

fn client() -> reqwest::Client {
    http_client(Duration::from_secs(5)).unwrap()
}

fn request(model: &str) -> CompletionRequest {
    CompletionRequest::new("You are Sahiti.", vec![ChatMessage::user("hello")])
        .with_model(model)
        .with_temperature(0.7)
}

async fn collect_text(provider: &dyn LlmProvider, request: &CompletionRequest) -> Result<String> {
    let mut rx = provider.stream_completion(request).await?;
    let mut text = String::new();
    while let Some(chunk) = rx.recv().await {
        if let StreamChunk::TextDelta(delta) = chunk? {
            text.push_str(&delta);
        }
    }
    Ok(text)
}

#[tokio::test]
async fn test_groq_streams_openai_format() {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer gsk_test")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "llama-3.1-8b-instant",
            "stream": true,
            "messages": [
                {"role": "system", "content": "You are Sahiti."},
                {"role": "user", "content": "hello"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let provider = OpenAIProvider::new_groq(client(), "gsk_test").with_base_url(server.url());
    let text = collect_text(&provider, &request("llama-3.1-8b-instant"))
        .await
        .unwrap();

    assert_eq!(text, "Hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_rejected_key_is_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#)
        .create_async()
        .await;

    let provider = OpenAIProvider::new_openai(client(), "sk-wrong").with_base_url(server.url());
    let err = provider
        .stream_completion(&request("gpt-4o-mini"))
        .await
        .unwrap_err();

    let classified = ChatError::from_upstream(Provider::OpenAI, &err);
    assert!(matches!(classified, ChatError::UpstreamAuthFailure { .. }));
}

#[tokio::test]
async fn test_rate_limit_is_generic_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
        .create_async()
        .await;

    let provider = OpenAIProvider::new_groq(client(), "gsk_test").with_base_url(server.url());
    let err = provider
        .stream_completion(&request("llama-3.1-8b-instant"))
        .await
        .unwrap_err();

    let classified = ChatError::from_upstream(Provider::Groq, &err);
    match classified {
        ChatError::UpstreamFailure { details, .. } => assert!(details.contains("Rate limit")),
        other => panic!("expected UpstreamFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_streams_candidates() {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hi\"}]}}]}\r\n\r\n",
        "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\" there\"}]},\"finishReason\":\"STOP\"}]}\r\n\r\n",
    );
    let mock = server
        .mock(
            "POST",
            "/v1beta/models/gemini-2.0-flash:streamGenerateContent",
        )
        .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
        .match_header("x-goog-api-key", "AIzaSytest")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "systemInstruction": {"parts": [{"text": "You are Sahiti."}]},
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let provider = GeminiProvider::new(client(), "AIzaSytest").with_base_url(server.url());
    let text = collect_text(&provider, &request("gemini-2.0-flash"))
        .await
        .unwrap();

    assert_eq!(text, "Hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_invalid_key_is_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "POST",
            "/v1beta/models/gemini-2.0-flash:streamGenerateContent",
        )
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#)
        .create_async()
        .await;

    let provider = GeminiProvider::new(client(), "AIzaSybad").with_base_url(server.url());
    let err = provider
        .stream_completion(&request("gemini-2.0-flash"))
        .await
        .unwrap_err();

    assert!(matches!(
        ChatError::from_upstream(Provider::Gemini, &err),
        ChatError::UpstreamAuthFailure { .. }
    ));
}

#[tokio::test]
async fn test_claude_streams_messages_events() {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
        "event: ping\n",
        "data: {\"type\":\"ping\"}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" there\"}}\n\n",
        "event: message_delta\n",
        "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"}}\n\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n\n",
    );
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "sk-ant-test")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "system": "You are Sahiti.",
            "stream": true
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let provider = ClaudeProvider::new(client(), "sk-ant-test").with_base_url(server.url());
    let mut rx = provider
        .stream_completion(&request("claude-sonnet-4-20250514"))
        .await
        .unwrap();

    let mut chunks = Vec::new();
    while let Some(chunk) = rx.recv().await {
        chunks.push(chunk.unwrap());
    }

    assert_eq!(
        chunks,
        vec![
            StreamChunk::TextDelta("Hi".into()),
            StreamChunk::TextDelta(" there".into()),
            StreamChunk::Finished {
                reason: Some("end_turn".into())
            },
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_claude_midstream_error() {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
        "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
    );
    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let provider = ClaudeProvider::new(client(), "sk-ant-test").with_base_url(server.url());
    let mut rx = provider
        .stream_completion(&request("claude-sonnet-4-20250514"))
        .await
        .unwrap();

    assert_eq!(
        rx.recv().await.unwrap().unwrap(),
        StreamChunk::TextDelta("Hi".into())
    );
    let err = rx.recv().await.unwrap().unwrap_err();
    assert!(err.to_string().contains("Overloaded"));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_stalled_stream_hits_max_duration() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|w| {
            w.write_all(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n")?;
            w.flush()?;
            std::thread::sleep(Duration::from_secs(4));
            w.write_all(b"data: [DONE]\n\n")
        })
        .create_async()
        .await;

    let mut config = Config::default();
    config.server.max_duration_secs = 1;
    config.providers.groq.base_url = Some(server.url());
    let factory = HttpProviderFactory::new(&config).unwrap();
    let provider = factory.create(Provider::Groq, "gsk_test").unwrap();

    let started = Instant::now();
    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        collect_text(provider.as_ref(), &request("llama-3.1-8b-instant")),
    )
    .await
    .expect("upstream call should be cut off by the client timeout");

    // Either the send or the body read times out, depending on when the
    // first chunk is flushed; neither may run to completion.
    assert!(outcome.is_err(), "stalled stream completed: {:?}", outcome);
    assert!(started.elapsed() < Duration::from_secs(4));
}
