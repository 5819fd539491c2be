//! Chat history for the news assistant
//!
//! Keeps a bounded list of (user, bot) turns and turns the most recent ones
//! into model messages for multi-turn follow-ups.

use chrono::{DateTime, Utc};
use pulse_llm::Message;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of conversation turns to keep in history
const MAX_HISTORY_SIZE: usize = 50;

/// A single exchange with the chatbot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// What the user asked
    pub user: String,
    /// What the chatbot answered
    pub bot: String,
    /// Timestamp of the turn
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded chat history, oldest turns dropped first
#[derive(Debug, Clone)]
pub struct ConversationManager {
    history: VecDeque<ConversationTurn>,
    max_history: usize,
}

impl Default for ConversationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationManager {
    /// Create a new conversation manager
    pub fn new() -> Self {
        Self::with_max_history(MAX_HISTORY_SIZE)
    }

    /// Create with custom history size
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Record a turn, trimming the oldest ones past the limit
    pub fn add_turn(&mut self, user: impl Into<String>, bot: impl Into<String>) {
        self.history.push_back(ConversationTurn::new(user, bot));
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Turns in the order they happened
    pub fn history(&self) -> &VecDeque<ConversationTurn> {
        &self.history
    }

    /// The last `n` turns, newest first
    pub fn last_turns(&self, n: usize) -> Vec<&ConversationTurn> {
        self.history.iter().rev().take(n).collect()
    }

    /// The last `n` turns as alternating user/assistant messages, oldest first
    pub fn recent_messages(&self, n: usize) -> Vec<Message> {
        let skip = self.history.len().saturating_sub(n);
        self.history
            .iter()
            .skip(skip)
            .flat_map(|turn| [Message::user(&turn.user), Message::assistant(&turn.bot)])
            .collect()
    }

    /// Clear conversation history
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
