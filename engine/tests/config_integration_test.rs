//! Integration tests for configuration loading
//!
//! These tests exercise `Config::load_from_path` end to end against real
//! files: parsing, validation, and the side effects of processing (missing
//! workspace and data directories get created, paths come back canonical).

use std::fs;

use tempfile::TempDir;

use mend_engine::config::Config;
use mend_engine::errors::EngineError;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_full_config_from_file() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("project");
    let data_dir = temp.path().join("data");

    let path = write_config(
        &temp,
        &format!(
            r#"
[core]
workspace = "{}"
log_level = "debug"
data_dir = "{}"

[llm.ollama]
base_url = "http://127.0.0.1:11434"
model = "codellama:13b"
request_timeout_secs = 60

[memory]
max_short_term_messages = 20
keep_recent = 4
recent_window = 6

[pipeline]
target_file = "src/lib.rs"
"#,
            workspace.display(),
            data_dir.display()
        ),
    );

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.llm.ollama.model, "codellama:13b");
    assert_eq!(config.llm.ollama.request_timeout_secs, 60);
    assert_eq!(config.memory.max_short_term_messages, 20);
    assert_eq!(config.memory.keep_recent, 4);
    assert_eq!(config.memory.recent_window, 6);
    assert_eq!(config.pipeline.target_file, "src/lib.rs");

    // Processing created the missing directories
    assert!(workspace.is_dir());
    assert!(data_dir.is_dir());
    // The workspace came back canonical
    assert_eq!(config.core.workspace, workspace.canonicalize().unwrap());
    assert_eq!(config.memory_dir(), data_dir.join("memory"));
}

#[test]
fn test_minimal_config_fills_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        &format!(
            r#"
[core]
workspace = "{}"
data_dir = "{}"
"#,
            temp.path().join("ws").display(),
            temp.path().join("data").display()
        ),
    );

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.core.log_level, "info");
    assert_eq!(config.llm.ollama.base_url, "http://127.0.0.1:11434");
    assert_eq!(config.llm.ollama.model, "qwen2.5-coder:7b");
    assert_eq!(config.memory.max_short_term_messages, 10);
    assert_eq!(config.memory.keep_recent, 5);
    assert_eq!(config.memory.recent_window, 8);
    assert_eq!(config.pipeline.target_file, "src/main.rs");
}

#[test]
fn test_missing_file_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let result = Config::load_from_path(&temp.path().join("nope.toml"));

    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_malformed_toml_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[core\nworkspace = ");

    let result = Config::load_from_path(&path);

    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_invalid_memory_bounds_rejected_at_load() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        &format!(
            r#"
[core]
workspace = "{}"
data_dir = "{}"

[memory]
max_short_term_messages = 5
keep_recent = 5
"#,
            temp.path().join("ws").display(),
            temp.path().join("data").display()
        ),
    );

    let result = Config::load_from_path(&path);

    match result {
        Err(EngineError::Config(msg)) => {
            assert!(msg.contains("keep_recent"), "got: {msg}");
        }
        other => panic!("Expected Config error, got: {:?}", other),
    }
}

#[test]
fn test_invalid_log_level_rejected_at_load() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        &format!(
            r#"
[core]
workspace = "{}"
log_level = "loud"
"#,
            temp.path().display()
        ),
    );

    let result = Config::load_from_path(&path);

    assert!(matches!(result, Err(EngineError::Config(_))));
}
