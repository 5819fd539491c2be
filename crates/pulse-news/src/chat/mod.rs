//! News chatbot backed by a hosted language model
//!
//! The bot never fails: every problem is turned into a reply the dashboard
//! can show as-is.

mod conversation;

pub use conversation::{ConversationManager, ConversationTurn};

use crate::config::NewsConfig;
use crate::error::Result;
use crate::pipeline::AnalysisReport;
use pulse_llm::providers::GeminiProvider;
use pulse_llm::{CompletionRequest, LLMProvider, Message};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reply when no model client could be built
pub const NO_CLIENT_REPLY: &str = "Error: Gemini client not initialized.";
/// Reply to a blank prompt
pub const BLANK_PROMPT_REPLY: &str = "Please enter a valid query.";
/// Reply when the model answers with nothing
pub const EMPTY_REPLY: &str = "No response from Gemini.";

/// Previous turns sent along with a new prompt
const CONTEXT_TURNS: usize = 5;
/// Headlines included in the system prompt
const MAX_CONTEXT_HEADLINES: usize = 20;
const MAX_REPLY_TOKENS: usize = 1024;

const SYSTEM_PROMPT: &str = "You are a helpful news assistant. Answer briefly and factually.";

/// Gemini client for `config`, `None` when no key is set
///
/// Shared by every chatbot a server hands out.
pub fn gemini_provider(config: &NewsConfig) -> Result<Option<Arc<dyn LLMProvider>>> {
    let Some(key) = config.gemini_api_key.as_deref() else {
        warn!("No Gemini API key set, chatbot disabled");
        return Ok(None);
    };
    let provider: Arc<dyn LLMProvider> = Arc::new(GeminiProvider::new(key)?);
    info!(model = %config.chat_model, "Gemini chat client ready");
    Ok(Some(provider))
}

/// A reply that is either known already or needs one model call
///
/// Owns its request, so callers can drop locks on the bot while it resolves.
pub enum PendingReply {
    Ready(String),
    Request {
        provider: Arc<dyn LLMProvider>,
        request: CompletionRequest,
    },
}

impl PendingReply {
    pub async fn resolve(self) -> String {
        let (provider, request) = match self {
            Self::Ready(reply) => return reply,
            Self::Request { provider, request } => (provider, request),
        };
        match provider.complete(request).await {
            Ok(response) => match response.text() {
                Some(text) => {
                    debug!(tokens = response.usage.total(), "Chat reply received");
                    text.trim().to_string()
                }
                None => EMPTY_REPLY.to_string(),
            },
            Err(e) => {
                warn!("Chat request failed: {e}");
                format!("Error: {e}")
            }
        }
    }
}

/// Chat assistant with its own history
pub struct NewsChatbot {
    provider: Option<Arc<dyn LLMProvider>>,
    model: String,
    history: ConversationManager,
    headlines: Vec<String>,
}

impl NewsChatbot {
    pub fn new(provider: Option<Arc<dyn LLMProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            history: ConversationManager::new(),
            headlines: Vec::new(),
        }
    }

    /// Build a Gemini-backed bot when a key is configured
    ///
    /// A missing key is not an error; the bot then answers every prompt
    /// with [`NO_CLIENT_REPLY`].
    pub fn from_config(config: &NewsConfig) -> Result<Self> {
        Ok(Self::new(gemini_provider(config)?, &config.chat_model))
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Give the model the headlines of `report` as background
    pub fn set_context(&mut self, report: &AnalysisReport) {
        self.headlines = report
            .headlines()
            .into_iter()
            .take(MAX_CONTEXT_HEADLINES)
            .map(str::to_string)
            .collect();
    }

    fn system_prompt(&self) -> String {
        if self.headlines.is_empty() {
            return SYSTEM_PROMPT.to_string();
        }
        let mut prompt = format!("{SYSTEM_PROMPT}\n\nToday's headlines:\n");
        for headline in &self.headlines {
            prompt.push_str("- ");
            prompt.push_str(headline);
            prompt.push('\n');
        }
        prompt
    }

    /// Everything needed to answer `prompt`, detached from `self`
    pub fn prepare(&self, prompt: &str) -> PendingReply {
        let Some(provider) = &self.provider else {
            return PendingReply::Ready(NO_CLIENT_REPLY.to_string());
        };
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return PendingReply::Ready(BLANK_PROMPT_REPLY.to_string());
        }

        let request = CompletionRequest::builder(&self.model)
            .system(self.system_prompt())
            .messages(self.history.recent_messages(CONTEXT_TURNS))
            .add_message(Message::user(prompt))
            .max_tokens(MAX_REPLY_TOKENS)
            .build();
        PendingReply::Request {
            provider: Arc::clone(provider),
            request,
        }
    }

    /// Answer `prompt` without touching the history
    pub async fn respond(&self, prompt: &str) -> String {
        self.prepare(prompt).resolve().await
    }

    /// Add an exchange to the history; blank prompts are not recorded
    pub fn record(&mut self, prompt: &str, reply: impl Into<String>) {
        let prompt = prompt.trim();
        if !prompt.is_empty() {
            self.history.add_turn(prompt, reply.into());
        }
    }

    /// Answer `prompt` and record the exchange
    pub async fn send(&mut self, prompt: &str) -> String {
        let reply = self.respond(prompt).await;
        self.record(prompt, reply.clone());
        reply
    }

    pub fn history(&self) -> &ConversationManager {
        &self.history
    }

    /// Clear chat history
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, NewsProvider};
    use async_trait::async_trait;
    use mockall::mock;
    use pulse_llm::{CompletionResponse, LLMError, StopReason, TokenUsage};

    mock! {
        Provider {}

        #[async_trait]
        impl LLMProvider for Provider {
            async fn complete(&self, request: CompletionRequest) -> pulse_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn bot(provider: MockProvider) -> NewsChatbot {
        NewsChatbot::new(Some(Arc::new(provider)), "gemini-flash-latest")
    }

    #[tokio::test]
    async fn test_missing_client_checked_first() {
        let chatbot = NewsChatbot::new(None, "gemini-flash-latest");
        assert!(!chatbot.is_enabled());
        assert_eq!(chatbot.respond("hello").await, NO_CLIENT_REPLY);
        assert_eq!(chatbot.respond("   ").await, NO_CLIENT_REPLY);
    }

    #[tokio::test]
    async fn test_blank_prompt() {
        let mut provider = MockProvider::new();
        provider.expect_complete().never();
        assert_eq!(bot(provider).respond(" \n ").await, BLANK_PROMPT_REPLY);
    }

    #[tokio::test]
    async fn test_reply_and_history() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|request| {
                let last = request.messages.last().map(|m| m.content.clone());
                Ok(reply(&format!("  echo {}  ", last.unwrap_or_default())))
            });

        let mut chatbot = bot(provider);
        assert_eq!(chatbot.send("first").await, "echo first");
        assert_eq!(chatbot.send("second").await, "echo second");
        assert_eq!(chatbot.history().len(), 2);
        assert_eq!(chatbot.history().history()[1].bot, "echo second");

        chatbot.clear();
        assert!(chatbot.history().is_empty());
    }

    #[tokio::test]
    async fn test_follow_up_carries_previous_turns() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .withf(|request| request.messages.len() == 3)
            .times(1)
            .returning(|_| Ok(reply("ok")));
        provider
            .expect_complete()
            .withf(|request| request.messages.len() == 1)
            .times(1)
            .returning(|_| Ok(reply("ok")));

        let mut chatbot = bot(provider);
        chatbot.send("one").await;
        chatbot.send("two").await;
    }

    #[tokio::test]
    async fn test_prepared_reply_outlives_borrow() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_| Ok(reply("Markets were calm.")));

        let mut chatbot = bot(provider);
        let pending = chatbot.prepare("What moved markets?");
        chatbot.clear();
        let answer = pending.resolve().await;
        chatbot.record("What moved markets?", answer);

        assert_eq!(chatbot.history().len(), 1);
        assert_eq!(chatbot.history().history()[0].bot, "Markets were calm.");
    }

    #[tokio::test]
    async fn test_blank_prompt_not_recorded() {
        let mut chatbot = NewsChatbot::new(None, "gemini-flash-latest");
        assert_eq!(chatbot.send("  ").await, NO_CLIENT_REPLY);
        assert!(chatbot.history().is_empty());

        assert_eq!(chatbot.send("hello").await, NO_CLIENT_REPLY);
        assert_eq!(chatbot.history().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply() {
        let mut provider = MockProvider::new();
        provider.expect_complete().returning(|_| Ok(reply("  ")));
        assert_eq!(bot(provider).respond("hi").await, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_provider_error() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .returning(|_| Err(LLMError::RateLimitExceeded("quota".to_string())));
        assert_eq!(
            bot(provider).respond("hi").await,
            "Error: Rate limit exceeded: quota"
        );
    }

    #[tokio::test]
    async fn test_headlines_in_system_prompt() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .withf(|request| {
                request
                    .system
                    .as_deref()
                    .is_some_and(|s| s.contains("- Rupee hits record high"))
            })
            .returning(|_| Ok(reply("summary")));

        let mut report = AnalysisReport::empty();
        report.articles.push(crate::model::AnnotatedArticle {
            article: Article::new("Rupee hits record high", NewsProvider::NewsData),
            cleaned_text: String::new(),
            tokens: Vec::new(),
            lemmas: Vec::new(),
            sentiment: crate::nlp::SentimentLabel::Positive,
            stars: 5,
            sentiment_score: 1.0,
            entities: Vec::new(),
            topic: 0,
            topic_label: "0_rupee".to_string(),
            topic_probability: 1.0,
        });

        let mut chatbot = bot(provider);
        chatbot.set_context(&report);
        assert_eq!(chatbot.respond("summarise").await, "summary");
    }

    #[test]
    fn test_from_config_without_key() {
        let chatbot = NewsChatbot::from_config(&NewsConfig::default()).unwrap();
        assert!(!chatbot.is_enabled());
        assert_eq!(chatbot.model(), "gemini-flash-latest");
    }
}
