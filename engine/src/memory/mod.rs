//! Conversation Memory
//!
//! Bounded short-term conversation memory with lossy long-term summarization.
//! The session buffer holds recent messages in order; once it grows past its
//! high-water mark the older messages are archived through the summarizer and
//! replaced by a compact summary record. Both the buffer and the summary are
//! persisted as flat JSON files under the data directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod store;
pub mod summarizer;

pub use store::MemoryStore;
pub use summarizer::{Summarizer, SummaryOutcome};

/// Current UNIX time as fractional seconds.
pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// A single message in the conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (user or assistant)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,

    /// Creation time as UNIX seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Message {
    /// Create a new user message stamped with the current time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Some(unix_now()),
        }
    }

    /// Create a new assistant message stamped with the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Some(unix_now()),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message
    User,

    /// Assistant message
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Summarized long-term conversation context
///
/// A single record that is fully replaced on every summarization cycle.
/// It reflects what was present in the most recently archived slice, not
/// an accumulation over the whole history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationSummary {
    /// Brief summary of the archived conversation
    pub summary: String,

    /// Key facts mentioned
    pub key_facts: Vec<String>,

    /// User preferences or interests expressed
    pub user_preferences: Vec<String>,

    /// When this record was written, as UNIX seconds
    pub last_updated: f64,
}
