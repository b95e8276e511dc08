//! Common test utilities for console and dispatch tests.

use dbgsh::commands::{load_commands, CommandRegistry, Dispatcher, HelpLocator};
use dbgsh::console::{Console, LineSource, ReadOutcome, ScriptError, ScriptEvaluator};
use dbgsh::error::Result;
use dbgsh::interrupt::InterruptFlag;
use dbgsh::session::MockSession;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

/// Lines seen by a [`RecordingEvaluator`].
pub type Seen = Rc<RefCell<Vec<String>>>;

/// Script evaluator that records lines. A line ending in `{` opens a
/// construct that a line `}` closes; `fail` reports an error.
#[derive(Default)]
pub struct RecordingEvaluator {
    pub seen: Seen,
    open: bool,
}

impl ScriptEvaluator for RecordingEvaluator {
    fn push(&mut self, line: &str, out: &mut dyn Write) -> std::result::Result<bool, ScriptError> {
        self.seen.borrow_mut().push(line.to_string());
        if line == "fail" {
            return Err(ScriptError::Status(1));
        }
        if line.ends_with('{') {
            self.open = true;
        } else if line == "}" {
            self.open = false;
            writeln!(out, "evaluated block")?;
        }
        Ok(self.open)
    }

    fn is_pending(&self) -> bool {
        self.open
    }

    fn reset(&mut self) {
        self.open = false;
    }
}

/// Line source fed from a fixed list of outcomes; records each prompt.
pub struct ScriptedSource {
    outcomes: VecDeque<ReadOutcome>,
    interactive: bool,
    pub prompts: Vec<String>,
}

impl ScriptedSource {
    pub fn new(interactive: bool, outcomes: Vec<ReadOutcome>) -> Self {
        Self {
            outcomes: outcomes.into(),
            interactive,
            prompts: Vec::new(),
        }
    }

    /// Interactive source that types `lines` and then hits Ctrl-D.
    pub fn typed(lines: &[&str]) -> Self {
        Self::new(true, lines.iter().map(|l| line(l)).collect())
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl LineSource for ScriptedSource {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        self.prompts.push(prompt.to_string());
        Ok(self.outcomes.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}

pub fn line(text: &str) -> ReadOutcome {
    ReadOutcome::Line(text.to_string())
}

/// Dispatcher with the built-in commands loaded for `session`.
pub fn dispatcher_for(session: &MockSession, help_dir: Option<PathBuf>) -> Dispatcher {
    let mut registry = CommandRegistry::new();
    load_commands(&mut registry, session, &[]).unwrap();
    Dispatcher::new(registry, HelpLocator::new(help_dir), InterruptFlag::new())
}

/// Console over a `MockSession` with a recording evaluator.
pub fn console_with(session: MockSession) -> (Console, Seen) {
    let dispatcher = dispatcher_for(&session, None);
    let evaluator = RecordingEvaluator::default();
    let seen = evaluator.seen.clone();
    (
        Console::new(dispatcher, Box::new(session), Box::new(evaluator)),
        seen,
    )
}

/// Runs one line through a dispatcher and returns what it printed.
pub fn run_line(dispatcher: &Dispatcher, session: &mut MockSession, input: &str) -> String {
    let mut out = Vec::new();
    dispatcher
        .run(session, &mut out, input)
        .unwrap_or_else(|e| panic!("dispatch of '{input}' failed: {e}"));
    String::from_utf8(out).unwrap()
}
