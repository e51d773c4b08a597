//! Intent classification for free-form user input.
//!
//! When no mode has been chosen explicitly, each input line is classified
//! to decide whether it should be answered conversationally or run through
//! the edit pipeline. Classification is a pure keyword heuristic over the
//! lowercased input; it never calls the model.

use serde::{Deserialize, Serialize};

/// First words that mark a line as a question.
const QUESTION_WORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "is", "are", "can", "could", "would", "should",
    "do", "does", "did",
];

/// Terms that mark a question as being about a coding task.
const CODING_TERMS: &[&str] = &[
    "create",
    "make",
    "write",
    "change",
    "modify",
    "add",
    "update",
    "fix",
    "implement",
    "build",
    "code",
    "function",
    "class",
    "file",
    "module",
];

/// Imperative verbs that mark a non-question as a coding task.
const ACTION_VERBS: &[&str] = &[
    "create",
    "make",
    "write",
    "change",
    "modify",
    "add",
    "update",
    "fix",
    "implement",
    "build",
];

/// Classified intent of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Conversational input, answered in chat mode.
    DefiniteChat,
    /// A coding task, routed into the edit pipeline.
    DefiniteAgent,
    /// No clear signal either way; the caller decides the default.
    Ambiguous,
}

/// Classifies a line of user input.
///
/// Total over all inputs: every string maps to exactly one [`Intent`].
///
/// # Examples
///
/// ```
/// use mend_engine::agent::intent::{classify, Intent};
///
/// assert_eq!(classify("explain lifetimes to me"), Intent::DefiniteChat);
/// assert_eq!(classify("fix the off-by-one in the loop"), Intent::DefiniteAgent);
/// assert_eq!(classify("hello"), Intent::Ambiguous);
/// ```
pub fn classify(input: &str) -> Intent {
    let lowered = input.trim().to_lowercase();

    if lowered.starts_with("chat")
        || lowered.starts_with("tell me")
        || lowered.starts_with("explain")
    {
        return Intent::DefiniteChat;
    }

    let first_is_question_word = lowered
        .split_whitespace()
        .next()
        .is_some_and(|word| QUESTION_WORDS.contains(&word));

    if first_is_question_word || lowered.contains('?') {
        // Questions about coding tasks still go to the pipeline.
        if CODING_TERMS.iter().any(|term| lowered.contains(term)) {
            return Intent::DefiniteAgent;
        }
        return Intent::DefiniteChat;
    }

    if ACTION_VERBS.iter().any(|verb| lowered.contains(verb)) {
        return Intent::DefiniteAgent;
    }

    Intent::Ambiguous
}
