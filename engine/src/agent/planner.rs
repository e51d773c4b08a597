//! Plan generation for the edit pipeline.
//!
//! Turns a user request into a numbered list of steps by asking the model
//! for a plan and parsing the numbered lines out of its reply.

use std::sync::Arc;

use crate::llm::prompts::{BASE_SYSTEM_PROMPT, PLANNER_PROMPT};
use crate::llm::{Result, TextGenerator};

/// Sampling temperature for planning. Low, so plans stay deterministic.
const PLAN_TEMPERATURE: f32 = 0.1;

pub struct Planner {
    llm: Arc<dyn TextGenerator>,
}

impl Planner {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Generate a numbered plan from a user request.
    ///
    /// An empty vec means the model produced no usable steps; callers treat
    /// that as "nothing to do" rather than an error.
    pub async fn create_plan(&self, user_request: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "User request:\n{}\n\nProduce a numbered step-by-step plan.",
            user_request
        );
        let system = format!("{}\n\n{}", BASE_SYSTEM_PROMPT, PLANNER_PROMPT);

        let response = self
            .llm
            .generate(&prompt, Some(&system), PLAN_TEMPERATURE)
            .await?;

        Ok(self.parse_plan(&response))
    }

    /// Convert model output into a clean list of steps.
    ///
    /// Keeps only lines that start with a digit ("1. step" or "1) step"),
    /// strips the numbering, and drops everything else. Total over any
    /// input; malformed output just yields fewer steps.
    fn parse_plan(&self, text: &str) -> Vec<String> {
        let mut steps = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                let step = line
                    .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')' | ' '))
                    .trim();
                if !step.is_empty() {
                    steps.push(step.to_string());
                }
            }
        }

        steps
    }
}
