// Chat module
// Persona prompts, request types and the request handler

mod mode;
pub mod persona;
mod service;
mod types;

pub use mode::Mode;
pub use persona::resolve_prompt;
pub use service::{ChatService, ChatStream, DEFAULT_PROVIDER};
pub use types::{last_user_text, ChatMessage, ChatRequest, Role};
