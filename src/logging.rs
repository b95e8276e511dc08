//! Logging configuration for dbgsh.
//!
//! The console owns stdout and the terminal, so logs go to a file by default.
//! `--log-stderr` sends them to stderr instead, which is handy for batch runs
//! and for capturing logs next to test output.
//!
//! Verbosity follows `RUST_LOG` and defaults to `info`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "dbgsh";
const LOG_FILE: &str = "dbgsh.log";

/// Where log records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The per-user log file from [`get_log_path`].
    File,
    /// Standard error.
    Stderr,
}

impl LogTarget {
    pub fn from_flag(log_stderr: bool) -> Self {
        if log_stderr {
            Self::Stderr
        } else {
            Self::File
        }
    }
}

/// Installs the global subscriber for `target`.
pub fn init(target: LogTarget) {
    match target {
        LogTarget::File => init_file_logging(),
        LogTarget::Stderr => init_stderr_logging(),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging to the per-user log file.
///
/// The file is truncated on every start, so it only holds the current
/// session. If the directory or file cannot be created a warning goes to
/// stderr and the shell runs without logging.
pub fn init_file_logging() {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            return;
        }
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Initializes logging to stderr. Console output on stdout stays clean.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the path for the log file.
///
/// `~/.local/state/dbgsh/dbgsh.log` on Linux (XDG state directory), the
/// config directory where there is no state directory, and the temp
/// directory as a last resort.
pub fn get_log_path() -> PathBuf {
    let base = dirs::state_dir().or_else(dirs::config_dir);
    log_path_in(base.as_deref())
}

fn log_path_in(base: Option<&Path>) -> PathBuf {
    match base {
        Some(dir) => dir.join(LOG_DIR).join(LOG_FILE),
        None => std::env::temp_dir().join(LOG_FILE),
    }
}
