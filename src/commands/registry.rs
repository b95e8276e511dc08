//! Command registry and command packs.
//!
//! The registry maps every name (canonical and alias) to a shared command
//! instance. It is filled by the startup sequence before the console reads
//! any input and only read afterwards; there is no unregister operation.

use super::command::Command;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Registration failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("cannot register a command with an empty name")]
    EmptyName,
}

/// A set of commands registered together at startup.
pub trait CommandPack {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Instantiates every command the pack provides.
    fn commands(&self) -> Vec<Arc<dyn Command>>;
}

/// Mapping from command name to command instance.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `name` to `command`, replacing any previous mapping.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        command: Arc<dyn Command>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.commands.insert(name.clone(), command).is_some() {
            debug!("Replaced command registered as '{name}'");
        }
        Ok(())
    }

    /// Registers a command under its canonical name and all of its aliases.
    pub fn add(&mut self, command: Arc<dyn Command>) -> Result<(), RegistryError> {
        self.register(command.name().to_string(), Arc::clone(&command))?;
        for alias in command.aliases() {
            self.register(*alias, Arc::clone(&command))?;
        }
        Ok(())
    }

    /// Registers every command of a pack.
    pub fn add_pack(&mut self, pack: &dyn CommandPack) -> Result<(), RegistryError> {
        let commands = pack.commands();
        debug!("Loading {} commands from pack '{}'", commands.len(), pack.name());
        for command in commands {
            self.add(command)?;
        }
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    /// Every registered name with its command, sorted by name.
    pub fn all(&self) -> &BTreeMap<String, Arc<dyn Command>> {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("names", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
