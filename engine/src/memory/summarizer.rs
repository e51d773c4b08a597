//! Conversation summarizer
//!
//! Turns an archived slice of conversation into a compact summary record
//! via one model call. The model is asked for a fixed line format
//! (SUMMARY/FACTS/PREFERENCES) which is parsed tolerantly: unknown lines
//! are ignored and missing sections default to empty.

use std::sync::Arc;

use crate::llm::prompts::SUMMARIZER_SYSTEM_PROMPT;
use crate::llm::{Result, TextGenerator};
use crate::memory::{Message, MessageRole};

/// Sampling temperature for summarization calls
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Extracted summary content, not yet persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryOutcome {
    /// Brief summary of the conversation
    pub summary: String,

    /// Key facts mentioned
    pub key_facts: Vec<String>,

    /// User preferences or interests expressed
    pub user_preferences: Vec<String>,
}

/// Handles summarization of conversation history
pub struct Summarizer {
    llm: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Summarize a conversation slice into a summary, key facts, and
    /// user preferences.
    ///
    /// An empty slice short-circuits to an empty outcome without calling
    /// the model. Transport failures propagate to the caller.
    pub async fn summarize(&self, messages: &[Message]) -> Result<SummaryOutcome> {
        if messages.is_empty() {
            return Ok(SummaryOutcome::default());
        }

        let transcript = build_transcript(messages);

        let prompt = format!(
            "Please summarize the following conversation in under 200 tokens.\n\
             Extract:\n\
             1. Main summary of the conversation\n\
             2. Key facts mentioned\n\
             3. User preferences or interests expressed\n\n\
             Conversation:\n\
             {}\n\n\
             Format your response as:\n\
             SUMMARY: [brief summary]\n\
             FACTS: [comma-separated list of key facts]\n\
             PREFERENCES: [comma-separated list of user preferences or interests]\n\n\
             Keep each section concise.",
            transcript
        );

        tracing::debug!("Summarizing {} archived messages", messages.len());

        let response = self
            .llm
            .generate(&prompt, Some(SUMMARIZER_SYSTEM_PROMPT), SUMMARY_TEMPERATURE)
            .await?;

        Ok(parse_summary(&response))
    }
}

/// Render messages as role-labeled transcript lines.
fn build_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|msg| {
            let label = match msg.role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            format!("{}: {}", label, msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the model's SUMMARY/FACTS/PREFERENCES line format.
///
/// Lines without a known prefix are ignored. A later occurrence of a
/// prefix overwrites an earlier one.
fn parse_summary(text: &str) -> SummaryOutcome {
    let mut outcome = SummaryOutcome::default();

    for line in text.lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("SUMMARY:") {
            outcome.summary = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("FACTS:") {
            outcome.key_facts = split_list(rest);
        } else if let Some(rest) = line.strip_prefix("PREFERENCES:") {
            outcome.user_preferences = split_list(rest);
        }
    }

    outcome
}

/// Split a comma-separated section into trimmed, non-empty entries.
fn split_list(section: &str) -> Vec<String> {
    section
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
