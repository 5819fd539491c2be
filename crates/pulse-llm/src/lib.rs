//! LLM provider abstraction layer for NewsPulse
//!
//! This crate provides provider-agnostic abstractions for talking to hosted
//! language models. It includes:
//!
//! - Message types for chat-style prompts
//! - Completion request/response types
//! - The [`LLMProvider`] trait
//! - Concrete providers (behind feature flags): Google Gemini and any
//!   OpenAI-compatible chat completions endpoint

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, DEFAULT_MAX_TOKENS, StopReason,
    TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(any(feature = "gemini", feature = "openai"))]
pub mod providers;
