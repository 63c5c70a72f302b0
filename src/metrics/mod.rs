// Metrics module
// Prometheus counters exposed on GET /metrics

mod chat;

pub use chat::ChatMetrics;
