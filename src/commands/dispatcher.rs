//! Dispatch of raw command lines.
//!
//! Tokenizes a line, resolves the first word in the registry and invokes the
//! command with the rest. The only failure that escapes is
//! [`NoSuchCommand`]; everything a command raises is printed by
//! [`Command::invoke`](super::Command::invoke).

use super::command::{CommandContext, ControlAction};
use super::contract::HelpLocator;
use super::registry::CommandRegistry;
use super::tokenizer::tokenize;
use crate::interrupt::InterruptFlag;
use crate::session::Session;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, warn};

/// No registered command matches the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No command for input: {line}")]
pub struct NoSuchCommand {
    /// The raw line as typed.
    pub line: String,
}

/// Resolves and runs command lines against a registry.
#[derive(Debug)]
pub struct Dispatcher {
    registry: CommandRegistry,
    help: HelpLocator,
    interrupt: InterruptFlag,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry, help: HelpLocator, interrupt: InterruptFlag) -> Self {
        Self {
            registry,
            help,
            interrupt,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Mutable access for late registration; lookups are never cached.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn help(&self) -> &HelpLocator {
        &self.help
    }

    pub fn interrupt(&self) -> &InterruptFlag {
        &self.interrupt
    }

    /// Runs one command line.
    ///
    /// Empty or whitespace-only lines are a no-op. Returns the control action
    /// the command requested, if any.
    pub fn run(
        &self,
        session: &mut dyn Session,
        out: &mut dyn Write,
        line: &str,
    ) -> Result<Option<ControlAction>, NoSuchCommand> {
        let not_found = || NoSuchCommand {
            line: line.to_string(),
        };

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                debug!("Cannot tokenize '{line}': {e}");
                return Err(not_found());
            }
        };
        let Some((name, argv)) = tokens.split_first() else {
            return Ok(None);
        };
        let command = self.registry.lookup(name).ok_or_else(not_found)?;

        debug!("Dispatching '{name}' with {} argument(s)", argv.len());
        let mut ctx = CommandContext {
            session,
            registry: &self.registry,
            help: &self.help,
            out,
            interrupt: &self.interrupt,
            control: None,
        };
        command.invoke(&mut ctx, argv);
        if let Err(e) = ctx.out.flush() {
            warn!("Failed to flush console output: {e}");
        }
        Ok(ctx.control)
    }
}
