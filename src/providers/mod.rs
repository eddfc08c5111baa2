pub mod base;
pub mod errors;
pub mod gemini;

pub use base::{ChatRequest, LLMProvider, LLMResponse, Message, ProviderMetrics};
pub use gemini::GeminiProvider;
