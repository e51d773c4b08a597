//! Turn routing and the edit pipeline.
//!
//! User input flows through the [`Controller`], which either answers in
//! chat mode or runs the plan, propose, diff, confirm, apply pipeline.
//! The intent classifier routes lines while no explicit mode is set.

pub mod chat;
pub mod controller;
pub mod intent;
pub mod planner;

pub use chat::ChatHandler;
pub use controller::{sanitize_code_output, ApprovalGate, Controller, Mode, TurnOutcome};
pub use intent::{classify, Intent};
pub use planner::Planner;
