//! The command contract.
//!
//! A command has a canonical name, an [`ArgumentContract`] and an
//! `execute` operation. Two entry points wrap execution:
//!
//! - [`Command::invoke_uncaught`] parses and executes, returning failures
//!   untranslated. Tests use it to observe the exact failure.
//! - [`Command::invoke`] translates every failure into console text and never
//!   returns one. This is what the dispatcher calls.

use super::contract::{ArgumentContract, HelpLocator, ParseFailure};
use super::registry::CommandRegistry;
use crate::interrupt::InterruptFlag;
use crate::session::{Session, SessionError};
use clap::ArgMatches;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

/// Domain failure raised while executing an already-parsed command.
#[derive(Error, Debug)]
pub enum CommandFailure {
    /// Command-specific error with a user-facing message.
    #[error("{0}")]
    Failed(String),

    /// The session could not satisfy a request.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Writing to the console failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// The user cancelled the command.
    #[error("interrupted")]
    Interrupted,
}

impl CommandFailure {
    /// Creates a command failure with the given message.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Either kind of failure `invoke_uncaught` can surface.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    Command(#[from] CommandFailure),
}

/// Control actions a command can request from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Leave the console loop.
    Exit,
}

/// Context provided to a command while it executes.
pub struct CommandContext<'a> {
    /// The debuggee session.
    pub session: &'a mut dyn Session,
    /// Registry the command was dispatched from (for help listings).
    pub registry: &'a CommandRegistry,
    /// Where external help text lives.
    pub help: &'a HelpLocator,
    /// Console output.
    pub out: &'a mut dyn Write,
    pub interrupt: &'a InterruptFlag,
    /// Action requested by the command, picked up by the console.
    pub control: Option<ControlAction>,
}

impl CommandContext<'_> {
    /// Returns `Interrupted` once the user has pressed Ctrl-C.
    pub fn check_interrupt(&self) -> Result<(), CommandFailure> {
        if self.interrupt.is_raised() {
            return Err(CommandFailure::Interrupted);
        }
        Ok(())
    }

    pub fn request(&mut self, action: ControlAction) {
        self.control = Some(action);
    }
}

/// A named, pluggable console command.
pub trait Command {
    /// Canonical name; the key the command is registered under.
    fn name(&self) -> &str;

    /// Additional names registered for the same instance.
    fn aliases(&self) -> &[&'static str] {
        &[]
    }

    /// One-line description for the help listing.
    fn summary(&self) -> Option<&str> {
        None
    }

    fn contract(&self) -> &ArgumentContract;

    /// Runs the command with parsed arguments.
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ArgMatches)
        -> Result<(), CommandFailure>;

    /// Full help text for this command.
    fn format_help(&self, help: &HelpLocator) -> String {
        self.contract().format_help(help)
    }

    /// Parses `argv` and executes, propagating both failure kinds as-is.
    fn invoke_uncaught(
        &self,
        ctx: &mut CommandContext<'_>,
        argv: &[String],
    ) -> Result<(), CommandError> {
        let args = self.contract().parse(argv)?;
        self.execute(ctx, &args)?;
        Ok(())
    }

    /// Parses and executes, printing any failure as `"{name}: {message}"`.
    ///
    /// Parse failures are followed by the usage line. A help request prints
    /// the command's help. Cancellation is swallowed silently.
    fn invoke(&self, ctx: &mut CommandContext<'_>, argv: &[String]) {
        ctx.interrupt.clear();
        let result = self.invoke_uncaught(ctx, argv);
        let written = match result {
            Ok(()) => Ok(()),
            Err(CommandError::Parse(ParseFailure::HelpRequested)) => {
                let text = self.format_help(ctx.help);
                writeln!(ctx.out, "{}", text.trim_end())
            }
            Err(CommandError::Parse(ParseFailure::Invalid { message, usage })) => {
                debug!("{}: parse failure: {message}", self.name());
                writeln!(ctx.out, "{}: {message}", self.name())
                    .and_then(|()| writeln!(ctx.out, "{}", usage.trim_end()))
            }
            Err(CommandError::Command(CommandFailure::Interrupted)) => {
                debug!("{}: interrupted", self.name());
                Ok(())
            }
            Err(CommandError::Command(failure)) => {
                debug!("{}: {failure}", self.name());
                writeln!(ctx.out, "{}: {failure}", self.name())
            }
        };
        ctx.interrupt.clear();
        if let Err(e) = written {
            debug!("Failed to write command output: {e}");
        }
    }
}
