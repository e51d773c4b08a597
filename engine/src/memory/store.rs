//! Session memory store
//!
//! Owns the bounded short-term buffer and the long-term summary record.
//! When the buffer grows past its high-water mark, everything except the
//! most recent tail is archived through the summarizer and the buffer
//! shrinks to the tail. The prior summary is replaced, not merged: the
//! record always reflects the most recently archived slice.
//!
//! Both records are flat JSON files rewritten whole after every mutating
//! operation, so a restart reconstructs the conversation from disk.
//! Corrupt or missing files degrade to an empty session and no summary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::MemoryConfig;
use crate::errors::EngineError;
use crate::llm::TextGenerator;
use crate::memory::summarizer::Summarizer;
use crate::memory::{unix_now, ConversationSummary, Message, MessageRole};

const SESSION_FILE: &str = "session.json";
const SUMMARY_FILE: &str = "summary.json";

/// Conversation memory with bounded short-term and summarized long-term storage
pub struct MemoryStore {
    /// Short-term message buffer, oldest first
    session_buffer: Vec<Message>,

    /// High-water mark: exceeding this triggers rotation
    max_short_term_messages: usize,

    /// Number of most recent messages retained by a rotation
    keep_recent: usize,

    session_file: PathBuf,
    summary_file: PathBuf,
    summarizer: Summarizer,
}

impl MemoryStore {
    /// Open the store rooted at `memory_dir`, creating the directory if
    /// needed and loading any persisted session.
    ///
    /// A session file that is missing or fails to parse yields an empty
    /// buffer rather than an error.
    pub fn new(
        memory_dir: &Path,
        llm: Arc<dyn TextGenerator>,
        config: &MemoryConfig,
    ) -> Result<Self, EngineError> {
        std::fs::create_dir_all(memory_dir)?;

        let session_file = memory_dir.join(SESSION_FILE);
        let summary_file = memory_dir.join(SUMMARY_FILE);
        let session_buffer = load_session(&session_file);

        Ok(Self {
            session_buffer,
            max_short_term_messages: config.max_short_term_messages,
            keep_recent: config.keep_recent,
            session_file,
            summary_file,
            summarizer: Summarizer::new(llm),
        })
    }

    /// Append a message to the session buffer.
    ///
    /// If the buffer exceeds its high-water mark this triggers a rotation:
    /// the messages older than the retained tail are summarized into the
    /// long-term record and dropped from the buffer. A failed rotation
    /// propagates its error and leaves the buffer unshrunk and the
    /// persisted records untouched; the next append retries.
    pub async fn add_message(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<(), EngineError> {
        let message = match role {
            MessageRole::User => Message::user(content),
            MessageRole::Assistant => Message::assistant(content),
        };
        self.session_buffer.push(message);

        if self.session_buffer.len() > self.max_short_term_messages {
            self.rotate().await?;
        } else {
            self.persist_session().await?;
        }

        Ok(())
    }

    /// The last `n` messages in chronological order (or fewer, if the
    /// buffer is shorter).
    pub fn recent_context(&self, n: usize) -> &[Message] {
        let start = self.session_buffer.len().saturating_sub(n);
        &self.session_buffer[start..]
    }

    /// Number of messages currently buffered.
    pub fn len(&self) -> usize {
        self.session_buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.session_buffer.is_empty()
    }

    /// Load the long-term summary record.
    ///
    /// A missing, unreadable, or corrupt record is treated as absent.
    pub fn summary(&self) -> Option<ConversationSummary> {
        let contents = std::fs::read_to_string(&self.summary_file).ok()?;
        match serde_json::from_str(&contents) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Ignoring corrupt summary record: {}", e);
                None
            }
        }
    }

    /// Replace the long-term summary record.
    ///
    /// The record is serialized completely and written in one shot; a
    /// reader never observes a partially updated summary.
    pub async fn save_summary(
        &self,
        summary: String,
        key_facts: Vec<String>,
        user_preferences: Vec<String>,
    ) -> Result<(), EngineError> {
        let record = ConversationSummary {
            summary,
            key_facts,
            user_preferences,
            last_updated: unix_now(),
        };

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| EngineError::Persistence(format!("Failed to serialize summary: {}", e)))?;
        tokio::fs::write(&self.summary_file, json).await?;

        Ok(())
    }

    /// Empty the session buffer and remove its persisted record.
    ///
    /// Safe to call repeatedly; clearing an already-empty session is a
    /// no-op. The long-term summary is left in place.
    pub async fn clear_session(&mut self) -> Result<(), EngineError> {
        self.session_buffer.clear();

        match tokio::fs::remove_file(&self.session_file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Archive everything except the retained tail, then shrink the buffer.
    async fn rotate(&mut self) -> Result<(), EngineError> {
        let tail_start = self.session_buffer.len().saturating_sub(self.keep_recent);
        let archived = &self.session_buffer[..tail_start];

        tracing::info!(
            "Rotating session memory: archiving {} messages, keeping {}",
            archived.len(),
            self.keep_recent
        );

        if !archived.is_empty() {
            let outcome = self.summarizer.summarize(archived).await?;
            self.save_summary(outcome.summary, outcome.key_facts, outcome.user_preferences)
                .await?;
        }

        self.session_buffer.drain(..tail_start);
        self.persist_session().await?;

        Ok(())
    }

    /// Rewrite the persisted session record from the current buffer.
    async fn persist_session(&self) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(&self.session_buffer)
            .map_err(|e| EngineError::Persistence(format!("Failed to serialize session: {}", e)))?;
        tokio::fs::write(&self.session_file, json).await?;
        Ok(())
    }
}

/// Load the persisted session buffer, degrading to empty on any failure.
fn load_session(session_file: &Path) -> Vec<Message> {
    let contents = match std::fs::read_to_string(session_file) {
        Ok(contents) => contents,
        Err(_) => return Vec::new(),
    };

    match serde_json::from_str(&contents) {
        Ok(messages) => messages,
        Err(e) => {
            tracing::warn!("Ignoring corrupt session record: {}", e);
            Vec::new()
        }
    }
}
