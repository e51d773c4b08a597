//! CLI interface for Mend
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for the assistant binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mend Coding Assistant
///
/// A local-first terminal assistant that chats about your code and applies
/// reviewed edits to a workspace file, backed by a locally hosted model.
#[derive(Parser, Debug)]
#[command(name = "mend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the interactive session (default when no command is given)
    Session,

    /// Run one coding task through the pipeline and exit
    Run {
        /// The task to execute
        task: String,
    },

    /// Ask one chat question and exit
    Ask {
        /// The question to ask
        prompt: String,
    },

    /// Clear the persisted conversation session
    Clear,

    /// Run system diagnostics
    Doctor,
}
