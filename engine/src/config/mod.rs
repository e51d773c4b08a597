//! Configuration management
//!
//! This module handles loading, validation, and management of the Mend
//! configuration. Configuration is stored in TOML format at
//! ~/.mend/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Workspace path, log level, data directory
//! - **llm**: Model backend settings
//! - **memory**: Session buffer bounds and chat context window
//! - **pipeline**: Code-editing pipeline settings
//!
//! # Path Expansion
//!
//! The configuration system automatically:
//! - Expands ~ to the user's home directory
//! - Canonicalizes the workspace to resolve symlinks and .. patterns
//! - Verifies the workspace is a directory
//! - Creates the workspace and data directories if they don't exist
//!
//! # Examples
//!
//! ```no_run
//! use mend_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! // Access configuration values
//! println!("Workspace: {:?}", config.core.workspace);
//! println!("Model: {}", config.llm.ollama.model);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::EngineError;

/// Main configuration structure
///
/// This structure represents the complete Mend configuration loaded from
/// ~/.mend/config.toml. Only the core section is required; every other
/// section falls back to its defaults when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Model backend configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Code-editing pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Workspace directory path (supports ~ expansion)
    pub workspace: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LLMConfig {
    /// Ollama backend settings
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Ollama backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// High-water mark for the short-term session buffer
    #[serde(default = "default_max_short_term_messages")]
    pub max_short_term_messages: usize,

    /// Number of recent messages a rotation keeps in the buffer
    #[serde(default = "default_keep_recent")]
    pub keep_recent: usize,

    /// Number of recent messages included in chat prompts
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_short_term_messages: default_max_short_term_messages(),
            keep_recent: default_keep_recent(),
            recent_window: default_recent_window(),
        }
    }
}

/// Code-editing pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Workspace-relative file the pipeline targets
    #[serde(default = "default_target_file")]
    pub target_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_file: default_target_file(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.mend")
}

fn default_ollama_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5-coder:7b".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_short_term_messages() -> usize {
    10
}

fn default_keep_recent() -> usize {
    5
}

fn default_recent_window() -> usize {
    8
}

fn default_target_file() -> String {
    "src/main.rs".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.mend/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration. Validates the configuration after loading and
    /// returns descriptive errors if validation fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails (invalid paths, invalid bounds)
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.mend/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".mend").join("config.toml"))
    }

    /// Create a default configuration
    ///
    /// The workspace defaults to the directory the binary is launched
    /// from, so running `mend` inside a project operates on that project.
    fn default_config() -> Self {
        Self {
            core: CoreConfig {
                workspace: PathBuf::from("."),
                log_level: default_log_level(),
                data_dir: default_data_dir(),
            },
            llm: LLMConfig::default(),
            memory: MemoryConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates field values and bounds
    /// - Expands ~ in paths
    /// - Canonicalizes the workspace path
    /// - Verifies the workspace is a directory
    /// - Creates the workspace and data directories if they don't exist
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        // Validate log level
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        // Validate model backend settings
        if self.llm.ollama.base_url.is_empty() {
            return Err(EngineError::Config(
                "llm.ollama.base_url must not be empty".to_string(),
            ));
        }
        if self.llm.ollama.request_timeout_secs == 0 {
            return Err(EngineError::Config(
                "llm.ollama.request_timeout_secs must be at least 1".to_string(),
            ));
        }

        // Validate memory bounds: a rotation must always shrink the buffer
        if self.memory.max_short_term_messages == 0 {
            return Err(EngineError::Config(
                "memory.max_short_term_messages must be at least 1".to_string(),
            ));
        }
        if self.memory.keep_recent >= self.memory.max_short_term_messages {
            return Err(EngineError::Config(format!(
                "memory.keep_recent ({}) must be less than memory.max_short_term_messages ({})",
                self.memory.keep_recent, self.memory.max_short_term_messages
            )));
        }
        if self.memory.recent_window == 0 {
            return Err(EngineError::Config(
                "memory.recent_window must be at least 1".to_string(),
            ));
        }

        // Validate pipeline target
        if self.pipeline.target_file.is_empty() {
            return Err(EngineError::Config(
                "pipeline.target_file must not be empty".to_string(),
            ));
        }
        if Path::new(&self.pipeline.target_file).is_absolute() {
            return Err(EngineError::Config(format!(
                "pipeline.target_file must be relative to the workspace: {}",
                self.pipeline.target_file
            )));
        }

        // Expand and validate workspace path
        self.core.workspace = expand_path(&self.core.workspace)?;
        self.core.workspace = canonicalize_or_create(&self.core.workspace)?;

        // Verify workspace is a directory
        if !self.core.workspace.is_dir() {
            return Err(EngineError::Config(format!(
                "Workspace path is not a directory: {:?}",
                self.core.workspace
            )));
        }

        // Expand and validate data directory
        self.core.data_dir = expand_path(&self.core.data_dir)?;

        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }

    /// Directory holding the persisted session and summary records.
    pub fn memory_dir(&self) -> PathBuf {
        self.core.data_dir.join("memory")
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

/// Canonicalize path, creating it if it doesn't exist
fn canonicalize_or_create(path: &Path) -> Result<PathBuf, EngineError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            EngineError::Config(format!("Failed to create directory {:?}: {}", path, e))
        })?;
    }

    path.canonicalize().map_err(|e| {
        EngineError::Config(format!("Failed to canonicalize {:?}: {}", path, e))
    })
}
