//! Mend Engine Library
//!
//! This library provides the core functionality of the Mend assistant.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Error types and handling
pub mod errors;

/// Model backend abstraction layer
pub mod llm;

/// Conversation memory module
pub mod memory;

/// Turn routing and edit pipeline module
pub mod agent;

/// Sandboxed filesystem and diff collaborators
pub mod tools;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

/// Interactive terminal session module
pub mod repl;
