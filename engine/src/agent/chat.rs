//! Chat mode conversation handling.
//!
//! Wraps a generation call with conversation context: the long-term summary
//! (when one exists) and a window of recent messages, both drawn from the
//! memory store. Every exchange is recorded back into the store, which
//! triggers rotation when the buffer outgrows its bound.

use std::sync::Arc;

use crate::errors::EngineError;
use crate::llm::prompts::{BASE_SYSTEM_PROMPT, CHAT_PROMPT};
use crate::llm::TextGenerator;
use crate::memory::{ConversationSummary, MemoryStore, Message, MessageRole};

/// Sampling temperature for chat. Higher than the pipeline stages so
/// conversation stays natural.
const CHAT_TEMPERATURE: f32 = 0.7;

pub struct ChatHandler {
    llm: Arc<dyn TextGenerator>,
    system_prompt: String,
    recent_window: usize,
}

impl ChatHandler {
    pub fn new(llm: Arc<dyn TextGenerator>, recent_window: usize) -> Self {
        Self {
            llm,
            system_prompt: format!("{}\n\n{}", BASE_SYSTEM_PROMPT, CHAT_PROMPT),
            recent_window,
        }
    }

    /// Process one chat message and return the assistant's reply.
    ///
    /// The user message is recorded before the prompt is assembled, so the
    /// recent window already reflects it; the reply is recorded after a
    /// successful generation. A failed generation leaves only the user
    /// message in the store.
    pub async fn process_chat(
        &self,
        memory: &mut MemoryStore,
        user_input: &str,
    ) -> Result<String, EngineError> {
        memory.add_message(MessageRole::User, user_input).await?;

        let prompt = build_chat_prompt(
            memory.summary().as_ref(),
            memory.recent_context(self.recent_window),
            user_input,
        );

        let response = self
            .llm
            .generate(&prompt, Some(&self.system_prompt), CHAT_TEMPERATURE)
            .await
            .map_err(EngineError::Llm)?;

        memory.add_message(MessageRole::Assistant, &response).await?;

        Ok(response)
    }
}

/// Assembles the context-aware chat prompt.
///
/// Layout: summary block (when present), recent conversation block (when
/// non-empty), then the current user line and an `Assistant:` cue for the
/// model to complete.
fn build_chat_prompt(
    summary: Option<&ConversationSummary>,
    recent: &[Message],
    user_input: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(summary) = summary {
        parts.push("CONVERSATION CONTEXT:".to_string());
        parts.push(format!("Summary: {}", summary.summary));
        if !summary.user_preferences.is_empty() {
            parts.push(format!(
                "User preferences: {}",
                summary.user_preferences.join(", ")
            ));
        }
        if !summary.key_facts.is_empty() {
            parts.push(format!("Key facts: {}", summary.key_facts.join(", ")));
        }
        parts.push(String::new());
    }

    if !recent.is_empty() {
        parts.push("RECENT CONVERSATION:".to_string());
        for message in recent {
            match message.role {
                MessageRole::User => parts.push(format!("User: {}", message.content)),
                MessageRole::Assistant => parts.push(format!("Assistant: {}", message.content)),
            }
        }
        parts.push(String::new());
    }

    parts.push(format!("User: {}", user_input));
    parts.push("Assistant:".to_string());

    parts.join("\n")
}
