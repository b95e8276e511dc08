//! The interactive console.
//!
//! A two-mode line loop. In command mode each line goes to the
//! [`Dispatcher`]; in script mode lines go to a [`ScriptEvaluator`]. The
//! keyword `python` enters script mode and `end` leaves it. While the
//! evaluator has a construct open, it receives every line unchanged.
//!
//! End of input on a terminal while in script mode is absorbed once: the
//! open construct is dropped, the console returns to command mode, and a
//! second end of input in a row terminates.

pub mod input;
pub mod script;

use crate::commands::{strip_comment, ControlAction, Dispatcher, NoSuchCommand};
use crate::error::Result;
use crate::session::Session;
use std::io::Write;
use tracing::{debug, info, warn};

pub use input::{EditorSource, LineSource, QueuedSource, ReadOutcome, ReaderSource};
pub use script::{ExternalEvaluator, PythonEvaluator, ScriptError, ScriptEvaluator};

/// Keyword that switches from command mode to script mode.
pub const SCRIPT_KEYWORD: &str = "python";
/// Keyword that switches from script mode back to command mode.
pub const END_KEYWORD: &str = "end";

/// Which interpreter consumes input lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
    Command,
    Script,
}

impl ConsoleMode {
    pub fn prompt(self) -> &'static str {
        match self {
            ConsoleMode::Command => "cmd>>> ",
            ConsoleMode::Script => ">>> ",
        }
    }
}

/// Result of feeding one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    /// A command asked to leave the console.
    Exit,
}

/// What to do after end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofOutcome {
    Resume,
    Terminate,
}

/// Why [`Console::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    EndOfInput,
    ExitRequested,
}

pub struct Console {
    dispatcher: Dispatcher,
    session: Box<dyn Session>,
    evaluator: Box<dyn ScriptEvaluator>,
    mode: ConsoleMode,
    exit_pending: bool,
}

impl Console {
    pub fn new(
        dispatcher: Dispatcher,
        session: Box<dyn Session>,
        evaluator: Box<dyn ScriptEvaluator>,
    ) -> Self {
        Self {
            dispatcher,
            session,
            evaluator,
            mode: ConsoleMode::Command,
            exit_pending: false,
        }
    }

    pub fn mode(&self) -> ConsoleMode {
        self.mode
    }

    /// Prompt for the next read. Non-interactive input gets none.
    pub fn prompt(&self, interactive: bool) -> &'static str {
        if interactive {
            self.mode.prompt()
        } else {
            ""
        }
    }

    /// Set after an absorbed end of input; cleared by the next line.
    pub fn exit_pending(&self) -> bool {
        self.exit_pending
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    /// Runs a command line directly, bypassing mode handling.
    pub fn run_command(
        &mut self,
        out: &mut dyn Write,
        line: &str,
    ) -> std::result::Result<Option<ControlAction>, NoSuchCommand> {
        self.dispatcher.run(self.session.as_mut(), out, line)
    }

    /// Processes one input line.
    pub fn push(&mut self, out: &mut dyn Write, line: &str) -> LineOutcome {
        self.exit_pending = false;

        if self.evaluator.is_pending() {
            self.feed_evaluator(out, line);
            return LineOutcome::Continue;
        }

        let candidate = strip_comment(line);
        match self.mode {
            ConsoleMode::Script if candidate == END_KEYWORD => {
                self.set_mode(ConsoleMode::Command);
                LineOutcome::Continue
            }
            ConsoleMode::Command if candidate == SCRIPT_KEYWORD => {
                self.set_mode(ConsoleMode::Script);
                LineOutcome::Continue
            }
            ConsoleMode::Script => {
                self.feed_evaluator(out, line);
                LineOutcome::Continue
            }
            ConsoleMode::Command => {
                if candidate.is_empty() {
                    return LineOutcome::Continue;
                }
                match self.run_command(out, candidate) {
                    Ok(Some(ControlAction::Exit)) => LineOutcome::Exit,
                    Ok(None) => LineOutcome::Continue,
                    Err(e) => {
                        debug!("{e}");
                        report(out, &e);
                        LineOutcome::Continue
                    }
                }
            }
        }
    }

    /// Handles end of input.
    pub fn end_of_input(&mut self, out: &mut dyn Write, interactive: bool) -> EofOutcome {
        if !interactive {
            return EofOutcome::Terminate;
        }
        if self.mode == ConsoleMode::Script && !self.exit_pending {
            info!("End of input in script mode; returning to command mode");
            self.evaluator.reset();
            self.set_mode(ConsoleMode::Command);
            self.exit_pending = true;
            if let Err(e) = writeln!(out) {
                warn!("Failed to write console output: {e}");
            }
            return EofOutcome::Resume;
        }
        EofOutcome::Terminate
    }

    /// Ctrl-C at the prompt drops any half-entered construct.
    pub fn interrupt_input(&mut self, out: &mut dyn Write) {
        self.evaluator.reset();
        if let Err(e) = writeln!(out, "^C") {
            warn!("Failed to write console output: {e}");
        }
    }

    /// Reads and processes lines until end of input or an exit request.
    pub fn run(&mut self, input: &mut dyn LineSource, out: &mut dyn Write) -> Result<ConsoleExit> {
        let interactive = input.is_interactive();
        info!("Console started (interactive: {interactive})");
        loop {
            match input.read_line(self.prompt(interactive))? {
                ReadOutcome::Line(line) => {
                    input.add_history(&line);
                    if self.push(out, &line) == LineOutcome::Exit {
                        info!("Exit requested");
                        return Ok(ConsoleExit::ExitRequested);
                    }
                }
                ReadOutcome::Eof => {
                    if self.end_of_input(out, interactive) == EofOutcome::Terminate {
                        info!("End of input");
                        return Ok(ConsoleExit::EndOfInput);
                    }
                }
                ReadOutcome::Interrupted => self.interrupt_input(out),
            }
        }
    }

    fn set_mode(&mut self, mode: ConsoleMode) {
        debug!("Console mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    fn feed_evaluator(&mut self, out: &mut dyn Write, line: &str) {
        if let Err(e) = self.evaluator.push(line, out) {
            debug!("Script error: {e}");
            self.evaluator.reset();
            report(out, &e);
        }
    }
}

fn report(out: &mut dyn Write, err: &dyn std::fmt::Display) {
    if let Err(e) = writeln!(out, "{err}").and_then(|()| out.flush()) {
        warn!("Failed to write console output: {e}");
    }
}
