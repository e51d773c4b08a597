//! Error types and handling
//!
//! This module provides the error types used throughout the Mend engine.
//! All errors implement the `MendErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! All error hints are scrubbed to ensure:
//! - No file contents are included
//! - All messages are safe to display to end users

use std::path::PathBuf;
use thiserror::Error;

use crate::llm::LLMError;

/// Trait for Mend error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait MendErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain
    /// file contents or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors abort the current turn; the session continues.
    /// Non-recoverable errors require fixing the environment and restarting.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// This enum represents all possible errors that can occur in the Mend engine.
/// Each variant carries the tag the caller needs to decide how to react:
/// configuration, model transport, sandbox violation, file access, or
/// persistence.
///
/// # Examples
///
/// ```
/// use mend_engine::errors::{EngineError, MendErrorExt};
/// use std::path::PathBuf;
///
/// let error = EngineError::PathOutsideWorkspace(PathBuf::from("../escape"));
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Model backend errors
    #[error("Model error: {0}")]
    Llm(#[from] LLMError),

    // File sandbox errors
    #[error("Path denied: {0:?}")]
    PathDenied(PathBuf),

    #[error("Path outside workspace: {0:?}")]
    PathOutsideWorkspace(PathBuf),

    // File access errors
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("Not a regular file: {0:?}")]
    NotAFile(PathBuf),

    #[error("File already exists: {0:?}")]
    FileExists(PathBuf),

    // Session record errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MendErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",

            // Model backend errors
            Self::Llm(LLMError::Timeout) => "The model took too long to respond. Try again",
            Self::Llm(LLMError::ProviderUnavailable(_)) => {
                "Cannot reach the model server. Is Ollama running?"
            }
            Self::Llm(_) => "Model request failed. Check the server and try again",

            // File sandbox errors
            Self::PathDenied(_) => "Access to this path is not allowed",
            Self::PathOutsideWorkspace(_) => "Operation must stay within the workspace",

            // File access errors
            Self::FileNotFound(_) => "File not found in the workspace",
            Self::NotAFile(_) => "Target path is not a regular file",
            Self::FileExists(_) => "File already exists and overwrite was not requested",

            // Session record errors
            Self::Persistence(_) => "Session records could not be saved",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // A broken configuration prevents startup entirely
            Self::Config(_) => false,

            // All other errors abort the current turn only
            _ => true,
        }
    }
}
