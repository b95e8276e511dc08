//! Built-in commands and the packs that register them.
//!
//! Each command is a unit struct implementing [`Command`]; packs list them
//! and [`load_commands`] is the startup sequence that fills a registry.

pub mod help;
pub mod memory;
pub mod source;
pub mod system;
pub mod types;

use std::sync::Arc;

use super::command::Command;
use super::registry::{CommandPack, CommandRegistry, RegistryError};
use crate::session::Session;
use tracing::info;

pub use help::HelpCommand;
pub use memory::ReadMemoryCommand;
pub use source::SourceCommand;
pub use system::{ExitCommand, KernelInfoCommand};
pub use types::WhatisCommand;

/// Commands available for every target.
pub struct BuiltinPack;

impl CommandPack for BuiltinPack {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![
            Arc::new(HelpCommand::new()),
            Arc::new(SourceCommand::new()),
            Arc::new(ReadMemoryCommand::new()),
            Arc::new(WhatisCommand::new()),
            Arc::new(ExitCommand::new()),
        ]
    }
}

/// Commands that only make sense on a Linux kernel target.
pub struct KernelPack;

impl CommandPack for KernelPack {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![Arc::new(KernelInfoCommand::new())]
    }
}

/// Registers the built-in pack, the kernel pack when the session targets a
/// Linux kernel, and any extra packs supplied by the host.
pub fn load_commands(
    registry: &mut CommandRegistry,
    session: &dyn Session,
    extra: &[&dyn CommandPack],
) -> Result<(), RegistryError> {
    registry.add_pack(&BuiltinPack)?;
    if session.is_linux_kernel() {
        registry.add_pack(&KernelPack)?;
    }
    for pack in extra {
        registry.add_pack(*pack)?;
    }
    info!("Registered {} command names", registry.len());
    Ok(())
}
