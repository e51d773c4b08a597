//! Turn controller and mode state machine.
//!
//! Every line of user input becomes exactly one turn. The controller routes
//! it by mode: an explicit `chat` or `agent` selection wins, and until one
//! is made the intent classifier decides per line. Agent turns run the
//! plan, propose, diff, confirm, apply pipeline; chat turns delegate to the
//! chat handler. All effects stay inside the turn: a failed stage aborts
//! cleanly with nothing written.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::agent::chat::ChatHandler;
use crate::agent::intent::{self, Intent};
use crate::agent::planner::Planner;
use crate::config::Config;
use crate::errors::EngineError;
use crate::llm::prompts::{BASE_SYSTEM_PROMPT, CODER_PROMPT, RAW_OUTPUT_REMINDER};
use crate::llm::TextGenerator;
use crate::memory::MemoryStore;
use crate::tools::{diff, FileTools};

/// Sampling temperature for code generation.
const CODE_TEMPERATURE: f32 = 0.1;
/// Tighter temperature for the single fence retry.
const RETRY_TEMPERATURE: f32 = 0.05;

/// Interaction mode chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Conversational exchanges with memory.
    Chat,
    /// The plan, propose, diff, confirm, apply pipeline.
    Agent,
}

/// Result of one turn, carried back to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Assistant reply from a chat exchange.
    ChatReply(String),
    /// The planner produced no usable steps.
    EmptyPlan,
    /// The proposal matched the current file; nothing to apply.
    NoChanges { plan: Vec<String> },
    /// The user declined the diff; nothing was written.
    Declined { plan: Vec<String>, diff: String },
    /// The proposal was written to the target file.
    Applied { plan: Vec<String>, diff: String },
}

/// Seam between the pipeline and the person approving it.
///
/// The terminal implementation prints the plan and diff and reads stdin;
/// tests script the answers.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    /// Shows the generated plan before code generation starts.
    fn present_plan(&self, plan: &[String]);

    /// Shows the diff and asks whether to apply it.
    ///
    /// Only an explicit affirmative returns `true`; anything else declines.
    async fn approve(&self, diff: &str, target: &str) -> Result<bool, EngineError>;
}

pub struct Controller {
    mode: Option<Mode>,
    llm: Arc<dyn TextGenerator>,
    planner: Planner,
    chat: ChatHandler,
    memory: MemoryStore,
    files: FileTools,
    gate: Box<dyn ApprovalGate>,
    target_file: String,
}

impl Controller {
    /// Wires up the pipeline from validated config.
    ///
    /// The memory store loads its persisted session here; the sandbox root
    /// is the configured workspace.
    pub fn new(
        config: &Config,
        llm: Arc<dyn TextGenerator>,
        gate: Box<dyn ApprovalGate>,
    ) -> Result<Self, EngineError> {
        let planner = Planner::new(llm.clone());
        let chat = ChatHandler::new(llm.clone(), config.memory.recent_window);
        let memory = MemoryStore::new(&config.memory_dir(), llm.clone(), &config.memory)?;
        let files = FileTools::new(&config.core.workspace)?;

        Ok(Self {
            mode: None,
            llm,
            planner,
            chat,
            memory,
            files,
            gate,
            target_file: config.pipeline.target_file.clone(),
        })
    }

    /// Currently selected mode, if the user has picked one.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Pins the mode; the intent classifier stops running after this.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!("Mode set to {:?}", mode);
        self.mode = Some(mode);
    }

    /// File the pipeline edits, relative to the workspace.
    pub fn target_file(&self) -> &str {
        &self.target_file
    }

    /// Runs one turn for a line of user input.
    pub async fn handle_input(&mut self, input: &str) -> Result<TurnOutcome, EngineError> {
        match self.mode {
            Some(Mode::Chat) => self.chat_turn(input).await,
            Some(Mode::Agent) => self.agent_turn(input).await,
            None => match intent::classify(input) {
                Intent::DefiniteChat => self.chat_turn(input).await,
                // No clear signal defaults to the pipeline.
                Intent::DefiniteAgent | Intent::Ambiguous => self.agent_turn(input).await,
            },
        }
    }

    /// Clears the persisted session buffer. The long-term summary survives.
    pub async fn clear_session(&mut self) -> Result<(), EngineError> {
        self.memory.clear_session().await
    }

    async fn chat_turn(&mut self, input: &str) -> Result<TurnOutcome, EngineError> {
        let reply = self.chat.process_chat(&mut self.memory, input).await?;
        Ok(TurnOutcome::ChatReply(reply))
    }

    async fn agent_turn(&mut self, input: &str) -> Result<TurnOutcome, EngineError> {
        debug!("Planning task");
        let plan = self.planner.create_plan(input).await?;
        if plan.is_empty() {
            return Ok(TurnOutcome::EmptyPlan);
        }
        self.gate.present_plan(&plan);

        let original = self.files.read_file(&self.target_file).await?;

        debug!("Generating proposal for {}", self.target_file);
        let mut proposal = self.propose(&plan, &original, false).await?;

        // One retry if Markdown still leaked through sanitization.
        if proposal.contains("```") {
            warn!("Model output contained Markdown fences, retrying");
            proposal = self.propose(&plan, &original, true).await?;
        }

        let diff = diff::unified(&original, &proposal, &self.target_file);
        if diff.trim().is_empty() {
            return Ok(TurnOutcome::NoChanges { plan });
        }

        if !self.gate.approve(&diff, &self.target_file).await? {
            return Ok(TurnOutcome::Declined { plan, diff });
        }

        self.files
            .write_file(&self.target_file, &proposal, true)
            .await?;
        info!("Applied changes to {}", self.target_file);

        Ok(TurnOutcome::Applied { plan, diff })
    }

    /// One code-generation call, sanitized.
    async fn propose(
        &self,
        plan: &[String],
        original: &str,
        retry: bool,
    ) -> Result<String, EngineError> {
        let plan_text = plan
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = format!(
            "Plan:\n{}\n\nFile: {}\nCurrent content:\n{}\n\nReturn the FULL modified file content.",
            plan_text, self.target_file, original
        );
        let temperature = if retry {
            prompt.push_str("\n\n");
            prompt.push_str(RAW_OUTPUT_REMINDER);
            RETRY_TEMPERATURE
        } else {
            CODE_TEMPERATURE
        };

        let system = format!("{}\n\n{}", BASE_SYSTEM_PROMPT, CODER_PROMPT);
        let raw = self
            .llm
            .generate(&prompt, Some(&system), temperature)
            .await
            .map_err(EngineError::Llm)?;

        Ok(sanitize_code_output(&raw))
    }
}

/// Strips Markdown code fences the model was told not to emit.
///
/// Removes a leading and a trailing fence line, then trims. Interior
/// fences survive, which is what the retry check looks for.
pub fn sanitize_code_output(text: &str) -> String {
    let mut lines: Vec<&str> = text.trim().lines().collect();

    if lines.first().is_some_and(|line| line.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|line| line.starts_with("```")) {
        lines.pop();
    }

    lines.join("\n").trim().to_string()
}
