// Prometheus counters for the chat endpoint

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Request and stream counters, rendered on GET /metrics
#[derive(Clone)]
pub struct ChatMetrics {
    registry: Registry,
    requests: IntCounterVec,
    chunks: IntCounterVec,
}

impl ChatMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("sahiti_chat_requests_total", "Chat requests by provider and outcome"),
            &["provider", "outcome"],
        )?;
        let chunks = IntCounterVec::new(
            Opts::new("sahiti_stream_chunks_total", "Text chunks streamed to clients"),
            &["provider"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(chunks.clone()))?;

        Ok(Self {
            registry,
            requests,
            chunks,
        })
    }

    /// Count one finished request. `provider` is "unknown" when resolution failed.
    pub fn record_outcome(&self, provider: &str, outcome: &str) {
        self.requests.with_label_values(&[provider, outcome]).inc();
    }

    /// Counter the stream body increments per forwarded chunk
    pub fn chunk_counter(&self, provider: &str) -> IntCounter {
        self.chunks.with_label_values(&[provider])
    }

    /// Text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_counts() {
        let metrics = ChatMetrics::new().unwrap();
        metrics.record_outcome("groq", "ok");
        metrics.record_outcome("groq", "ok");
        metrics.record_outcome("unknown", "malformed");
        metrics.chunk_counter("groq").inc_by(3);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"sahiti_chat_requests_total{outcome="ok",provider="groq"} 2"#));
        assert!(text.contains(r#"sahiti_chat_requests_total{outcome="malformed",provider="unknown"} 1"#));
        assert!(text.contains(r#"sahiti_stream_chunks_total{provider="groq"} 3"#));
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ChatMetrics::new().unwrap();
        let clone = metrics.clone();
        clone.record_outcome("gemini", "upstream_error");

        assert!(metrics
            .render()
            .unwrap()
            .contains(r#"provider="gemini""#));
    }
}
