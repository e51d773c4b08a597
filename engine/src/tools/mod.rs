//! Workspace collaborators used by the edit pipeline.
//!
//! `filesystem` confines reads and writes to the sandbox root; `diff`
//! renders the unified diff shown at the confirmation gate.

pub mod diff;
pub mod filesystem;

pub use filesystem::FileTools;
