//! Interactive terminal session.
//!
//! A line-oriented loop over stdin: `chat` and `agent` pin the mode,
//! `exit`/`quit` (or EOF) leave, blank lines are skipped, and every other
//! line runs one controller turn. Turn errors are printed and the loop
//! continues; only startup failures are fatal.
//!
//! Rendering is deliberately thin: plain text, no terminal control codes.

use std::io::{self, Write};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::agent::{ApprovalGate, Controller, Mode, TurnOutcome};
use crate::config::Config;
use crate::errors::{EngineError, MendErrorExt};
use crate::llm::ollama::OllamaClient;
use crate::llm::TextGenerator;

const THIN_DIVIDER: &str = "--------------------------------------------------------";

/// Terminal approval gate: prints the plan and the diff, reads the verdict
/// from stdin.
pub struct StdinApprovalGate;

#[async_trait]
impl ApprovalGate for StdinApprovalGate {
    fn present_plan(&self, plan: &[String]) {
        println!();
        println!("Execution plan:");
        for (i, step) in plan.iter().enumerate() {
            println!("  {:02} | {}", i + 1, step);
        }
    }

    async fn approve(&self, diff: &str, target: &str) -> Result<bool, EngineError> {
        println!();
        println!("Proposed changes to {}:", target);
        println!("{}", THIN_DIVIDER);
        print!("{}", diff);
        if !diff.ends_with('\n') {
            println!();
        }
        println!("{}", THIN_DIVIDER);

        print!("Apply changes? (yes/no): ");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;

        Ok(is_affirmative(&answer))
    }
}

/// Only an explicit affirmative applies changes; everything else declines.
fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Builds the model client from config.
pub fn build_llm(config: &Config) -> Arc<dyn TextGenerator> {
    Arc::new(OllamaClient::new(
        config.llm.ollama.base_url.clone(),
        config.llm.ollama.model.clone(),
        config.llm.ollama.request_timeout_secs,
    ))
}

/// Runs the interactive session until the user exits.
pub async fn run(config: &Config) -> Result<(), EngineError> {
    let llm = build_llm(config);
    let mut controller = Controller::new(config, llm, Box::new(StdinApprovalGate))?;

    print_banner(config);

    loop {
        print!("\n[mend] > ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF
            print_exit();
            break;
        }

        let input = line.trim();
        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                print_exit();
                break;
            }
            "chat" => {
                controller.set_mode(Mode::Chat);
                println!("\n  >> switched to chat mode <<");
                continue;
            }
            "agent" => {
                controller.set_mode(Mode::Agent);
                println!("\n  >> switched to agent mode <<");
                continue;
            }
            "" => continue,
            _ => {}
        }

        match controller.handle_input(input).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => {
                debug!("Turn failed: {}", e);
                println!("\n  [X] ERROR: {}", e);
                println!("      {}", e.user_hint());
            }
        }
    }

    Ok(())
}

/// Prints the result of one turn.
///
/// The plan and diff were already shown by the approval gate while the
/// turn was running; this line states how the turn ended.
pub fn print_outcome(outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::ChatReply(reply) => {
            println!();
            println!("{}", reply);
        }
        TurnOutcome::EmptyPlan => {
            println!("\n  [!] The model produced no plan for this task.");
        }
        TurnOutcome::NoChanges { .. } => {
            println!("\n  [!] No changes detected.");
        }
        TurnOutcome::Declined { .. } => {
            println!("\n  >> Changes discarded <<");
        }
        TurnOutcome::Applied { .. } => {
            println!("\n  [+] Changes successfully applied!");
        }
    }
}

fn print_banner(config: &Config) {
    println!();
    println!("mend v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", THIN_DIVIDER);
    println!("  workspace > {}", config.core.workspace.display());
    println!();
    println!("  chat   -> conversational mode");
    println!("  agent  -> coding tasks mode");
    println!("  exit   -> quit the assistant");
    println!("{}", THIN_DIVIDER);
}

fn print_exit() {
    println!("\n{}", THIN_DIVIDER);
    println!("  >> session ended <<");
    println!("{}", THIN_DIVIDER);
}
