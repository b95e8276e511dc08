//! Command-line argument parsing for dbgsh.

use clap::Parser;
use dbgsh::commands::HELP_DIR_ENV;
use dbgsh::config::Config;
use std::path::PathBuf;

/// Where console input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPlan {
    /// Lines given with `-c`, run in order.
    Commands(Vec<String>),
    /// A file of console lines.
    File(PathBuf),
    /// Standard input, interactive when it is a terminal.
    Stdin,
}

/// A scriptable debugger console.
#[derive(Parser, Debug)]
#[command(name = "dbgsh")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File of console lines to run non-interactively
    #[arg(value_name = "SCRIPT", conflicts_with = "command")]
    pub script: Option<PathBuf>,

    /// Run a console line and exit (repeatable)
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Vec<String>,

    /// Attach to a live process
    #[arg(short = 'p', long, value_name = "PID", conflicts_with = "kernel")]
    pub pid: Option<u32>,

    /// Debug the running kernel through /proc/kcore
    #[arg(short = 'k', long)]
    pub kernel: bool,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base directory for command help text
    #[arg(long, value_name = "DIR", env = HELP_DIR_ENV)]
    pub help_dir: Option<PathBuf>,

    /// Write logs to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Help directory: `--help-dir` or the environment, then the config file.
    pub fn help_dir(&self, config: &Config) -> Option<PathBuf> {
        self.help_dir.clone().or_else(|| config.help_dir.clone())
    }

    pub fn input_plan(&self) -> InputPlan {
        if !self.command.is_empty() {
            return InputPlan::Commands(self.command.clone());
        }
        match &self.script {
            Some(path) => InputPlan::File(path.clone()),
            None => InputPlan::Stdin,
        }
    }
}
