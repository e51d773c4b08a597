//! Command handlers for CLI operations
//!
//! This module implements the handlers for the one-shot CLI commands:
//! - run: Execute one coding task through the pipeline
//! - ask: Answer one chat question
//! - clear: Clear the persisted conversation session
//! - doctor: Validate configuration and check dependencies
//!
//! The interactive session lives in `repl`; these handlers share its
//! approval gate and model client construction.

use anyhow::{Context, Result};
use serde_json::json;

use crate::agent::{Controller, Mode, TurnOutcome};
use crate::config::Config;
use crate::llm::TextGenerator;
use crate::memory::MemoryStore;
use crate::repl::{self, StdinApprovalGate};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Run one coding task through the pipeline and exit.
///
/// The diff confirmation still happens interactively on stdin.
pub async fn handle_run(task: String, config: &Config, format: OutputFormat) -> Result<()> {
    let llm = repl::build_llm(config);
    let mut controller = Controller::new(config, llm, Box::new(StdinApprovalGate))
        .context("Failed to initialize the pipeline")?;
    controller.set_mode(Mode::Agent);

    let outcome = controller.handle_input(&task).await?;
    print_turn(&outcome, format)
}

/// Answer one chat question and exit.
///
/// The exchange is recorded in the session like any interactive chat turn.
pub async fn handle_ask(prompt: String, config: &Config, format: OutputFormat) -> Result<()> {
    let llm = repl::build_llm(config);
    let mut controller = Controller::new(config, llm, Box::new(StdinApprovalGate))
        .context("Failed to initialize the pipeline")?;
    controller.set_mode(Mode::Chat);

    let outcome = controller.handle_input(&prompt).await?;
    print_turn(&outcome, format)
}

/// Clear the persisted session buffer. The long-term summary survives.
pub async fn handle_clear(config: &Config, format: OutputFormat) -> Result<()> {
    let llm = repl::build_llm(config);
    let mut memory = MemoryStore::new(&config.memory_dir(), llm, &config.memory)
        .context("Failed to open session records")?;

    memory.clear_session().await?;

    match format {
        OutputFormat::Text => println!("Session cleared."),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({"cleared": true}))?);
        }
    }
    Ok(())
}

/// Run system diagnostics
///
/// Validates configuration and checks that required directories and the
/// model server are reachable.
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let mut issues: Vec<String> = Vec::new();
    let mut checks: Vec<(&str, String)> = Vec::new();

    // Check 1: Configuration validation
    // Config is already validated when loaded
    checks.push(("Configuration", "Valid".to_string()));

    // Check 2: Workspace directory
    if config.core.workspace.is_dir() {
        checks.push(("Workspace directory", "Exists".to_string()));
    } else {
        checks.push(("Workspace directory", "Missing".to_string()));
        issues.push(format!(
            "Workspace directory does not exist: {}",
            config.core.workspace.display()
        ));
    }

    // Check 3: Data directory
    if config.core.data_dir.is_dir() {
        checks.push(("Data directory", "Exists".to_string()));
    } else {
        checks.push(("Data directory", "Missing".to_string()));
        issues.push(format!(
            "Data directory does not exist: {}",
            config.core.data_dir.display()
        ));
    }

    // Check 4: Session records
    let session_file = config.memory_dir().join("session.json");
    if session_file.exists() {
        checks.push(("Session records", "Present".to_string()));
    } else {
        checks.push(("Session records", "Empty".to_string()));
    }

    // Check 5: Target file
    let target = config.core.workspace.join(&config.pipeline.target_file);
    if target.is_file() {
        checks.push(("Target file", config.pipeline.target_file.clone()));
    } else {
        checks.push(("Target file", "Missing".to_string()));
        issues.push(format!(
            "Pipeline target does not exist: {}",
            target.display()
        ));
    }

    // Check 6: Ollama reachability
    let llm = repl::build_llm(config);
    if llm.check_health().await {
        checks.push(("Ollama", "Available".to_string()));
        checks.push(("Model", config.llm.ollama.model.clone()));
    } else {
        checks.push(("Ollama", "Not available".to_string()));
        issues.push(format!(
            "Ollama is not reachable at {}. Start Ollama to use the assistant.",
            config.llm.ollama.base_url
        ));
    }

    // Output results
    match format {
        OutputFormat::Text => {
            println!("Mend System Diagnostics");
            println!("============================");
            println!();

            println!("System Checks:");
            for (check, status) in &checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("All checks passed.");
            } else {
                println!("Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Prints a one-shot turn outcome in the requested format.
fn print_turn(outcome: &TurnOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => repl::print_outcome(outcome),
        OutputFormat::Json => {
            let output = match outcome {
                TurnOutcome::ChatReply(reply) => {
                    json!({"outcome": "chat_reply", "reply": reply})
                }
                TurnOutcome::EmptyPlan => json!({"outcome": "empty_plan"}),
                TurnOutcome::NoChanges { plan } => {
                    json!({"outcome": "no_changes", "plan": plan})
                }
                TurnOutcome::Declined { plan, diff } => {
                    json!({"outcome": "declined", "plan": plan, "diff": diff})
                }
                TurnOutcome::Applied { plan, diff } => {
                    json!({"outcome": "applied", "plan": plan, "diff": diff})
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
