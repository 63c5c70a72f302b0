// Sahiti - Multi-provider chat routing service
// Library exports

pub mod chat; // Personas, request types and the request handler
pub mod config;
pub mod errors;
pub mod metrics;
pub mod providers; // Multi-provider LLM support
pub mod router; // Model tier and temperature selection
pub mod server; // HTTP endpoints
