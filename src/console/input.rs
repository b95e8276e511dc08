//! Line sources for the console.
//!
//! Interactive terminals go through rustyline (editing, history, Ctrl-C and
//! Ctrl-D reporting); everything else is read line by line from a `BufRead`.

use crate::error::{Result, ShellError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// What a read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line without its terminator.
    Line(String),
    /// The stream is exhausted (or Ctrl-D on a terminal).
    Eof,
    /// Ctrl-C while waiting for input.
    Interrupted,
}

/// A stream of input lines.
pub trait LineSource {
    /// Whether a person is typing (controls prompts and end-of-input handling).
    fn is_interactive(&self) -> bool;

    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Records a consumed line in the source's history, if it keeps one.
    fn add_history(&mut self, _line: &str) {}
}

/// Reads lines from any buffered reader. Never reports
/// [`ReadOutcome::Interrupted`]: the read retries across signals.
pub struct ReaderSource<R> {
    reader: R,
    interactive: bool,
}

impl<R: BufRead> ReaderSource<R> {
    /// A non-interactive source (scripts, pipes, tests).
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            interactive: false,
        }
    }

    /// Treats the reader as a terminal: prompts are printed and end-of-input
    /// gets interactive semantics.
    pub fn interactive(reader: R) -> Self {
        Self {
            reader,
            interactive: true,
        }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        if !prompt.is_empty() {
            let mut stdout = std::io::stdout();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(ReadOutcome::Eof),
            Ok(_) => {
                let trimmed = line.strip_suffix('\n').unwrap_or(&line);
                let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
                Ok(ReadOutcome::Line(trimmed.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Lines supplied up front, one console line per entry.
///
/// Entries are passed through as-is; an embedded newline stays part of its
/// line.
#[derive(Debug, Default)]
pub struct QueuedSource {
    lines: VecDeque<String>,
}

impl QueuedSource {
    pub fn new(lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
        }
    }
}

impl LineSource for QueuedSource {
    fn is_interactive(&self) -> bool {
        false
    }

    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
        Ok(match self.lines.pop_front() {
            Some(line) => ReadOutcome::Line(line),
            None => ReadOutcome::Eof,
        })
    }
}

/// Terminal input with line editing and persistent history.
pub struct EditorSource {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl EditorSource {
    /// Creates an editor, loading history from `history_file` when it exists.
    pub fn new(history_file: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new()
            .map_err(|e| ShellError::input(format!("Cannot initialize line editor: {e}")))?;
        if let Some(path) = &history_file {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    warn!("Could not load history from {}: {e}", path.display());
                }
            }
        }
        Ok(Self {
            editor,
            history_file,
        })
    }

    /// Writes history back to the configured file.
    pub fn save_history(&mut self) {
        let Some(path) = &self.history_file else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Could not create history directory: {e}");
                return;
            }
        }
        match self.editor.save_history(path) {
            Ok(()) => debug!("Saved history to {}", path.display()),
            Err(e) => warn!("Could not save history to {}: {e}", path.display()),
        }
    }
}

impl LineSource for EditorSource {
    fn is_interactive(&self) -> bool {
        true
    }

    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(ShellError::input(e.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!("Could not record history entry: {e}");
        }
    }
}
