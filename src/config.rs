//! Configuration management for dbgsh.
//!
//! Loads settings from a TOML file: where help text lives, where to keep
//! interactive history, and which interpreter evaluates script-mode input.

use crate::error::{Result, ShellError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for dbgsh.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Base directory for external help text (`<help_dir>/commands/<name>.txt`).
    pub help_dir: Option<PathBuf>,

    /// File used to persist interactive line history.
    pub history_file: Option<PathBuf>,

    #[serde(default)]
    pub script: ScriptConfig,
}

/// Script-mode interpreter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptConfig {
    /// Interpreter executable.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Keep one Python interpreter for the whole session, so names persist
    /// between chunks. When false, each chunk runs as `<interpreter> <args>
    /// <chunk>` in a fresh process, which works with any interpreter.
    #[serde(default = "default_persistent")]
    pub persistent: bool,

    /// Arguments placed before the script chunk (per-chunk mode only).
    #[serde(default = "default_interpreter_args")]
    pub args: Vec<String>,
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_persistent() -> bool {
    true
}

fn default_interpreter_args() -> Vec<String> {
    vec!["-c".to_string()]
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            persistent: default_persistent(),
            args: default_interpreter_args(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dbgsh")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ShellError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ShellError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
