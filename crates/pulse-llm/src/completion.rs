//! Provider-neutral request and reply shapes

use crate::Message;
use serde::{Deserialize, Serialize};

/// Reply budget when the caller sets none
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// One chat completion call: the model, an optional system instruction and the
/// turns so far, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: usize,
    /// `None` leaves sampling to the provider default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder(Self {
            model: model.into(),
            system: None,
            messages: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        })
    }
}

/// Chained setters over a [`CompletionRequest`]
#[derive(Debug, Clone)]
pub struct CompletionRequestBuilder(CompletionRequest);

impl CompletionRequestBuilder {
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.0.system = Some(instruction.into());
        self
    }

    /// Append earlier turns
    pub fn messages(mut self, turns: impl IntoIterator<Item = Message>) -> Self {
        self.0.messages.extend(turns);
        self
    }

    pub fn add_message(mut self, message: Message) -> Self {
        self.0.messages.push(message);
        self
    }

    pub fn max_tokens(mut self, limit: usize) -> Self {
        self.0.max_tokens = limit;
        self
    }

    pub fn temperature(mut self, value: f32) -> Self {
        self.0.temperature = Some(value);
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.0
    }
}

/// What ended generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    /// Output withheld by a safety or content filter
    ContentFilter,
}

/// Prompt and reply token counts as reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// The assistant turn produced by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Reply text, `None` when the model returned nothing
    pub fn text(&self) -> Option<&str> {
        self.message.text()
    }

    /// The reply was cut off by the token budget
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = CompletionRequest::builder("gemini-flash-latest").build();
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.system.is_none());
        assert!(request.temperature.is_none());
        assert!(request.messages.is_empty());
    }

    #[test]
    fn test_builder_keeps_turn_order() {
        let request = CompletionRequest::builder("gemini-flash-latest")
            .system("You are a news assistant")
            .messages([
                Message::user("Any cricket news?"),
                Message::assistant("India won in Mumbai."),
            ])
            .add_message(Message::user("Summarise today's headlines"))
            .max_tokens(256)
            .temperature(0.2)
            .build();

        assert_eq!(request.system.as_deref(), Some("You are a news assistant"));
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].content, "Summarise today's headlines");
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn test_truncated_reply() {
        let response = CompletionResponse {
            message: Message::assistant("The markets"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage {
                input_tokens: 40,
                output_tokens: 2,
            },
        };
        assert!(response.is_truncated());
        assert_eq!(response.text(), Some("The markets"));
        assert_eq!(response.usage.total(), 42);
    }
}
