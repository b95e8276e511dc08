//! System commands (exit, kernel-info).

use crate::commands::command::{Command, CommandContext, CommandFailure, ControlAction};
use crate::commands::contract::ArgumentContract;
use clap::ArgMatches;
use std::io::Write;

/// `exit` / `quit`: leave the console.
pub struct ExitCommand {
    contract: ArgumentContract,
}

impl ExitCommand {
    pub fn new() -> Self {
        let parser = clap::Command::new("exit").about("Leave the console");
        Self {
            contract: ArgumentContract::new(parser),
        }
    }
}

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for ExitCommand {
    fn name(&self) -> &str {
        "exit"
    }

    fn aliases(&self) -> &[&'static str] {
        &["quit"]
    }

    fn summary(&self) -> Option<&str> {
        Some("Leave the console")
    }

    fn contract(&self) -> &ArgumentContract {
        &self.contract
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &ArgMatches) -> Result<(), CommandFailure> {
        ctx.request(ControlAction::Exit);
        Ok(())
    }
}

/// `kernel-info`: word size and byte order of a kernel target.
pub struct KernelInfoCommand {
    contract: ArgumentContract,
}

impl KernelInfoCommand {
    pub fn new() -> Self {
        let parser =
            clap::Command::new("kernel-info").about("Show word size and byte order of the kernel");
        Self {
            contract: ArgumentContract::new(parser),
        }
    }
}

impl Default for KernelInfoCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for KernelInfoCommand {
    fn name(&self) -> &str {
        "kernel-info"
    }

    fn summary(&self) -> Option<&str> {
        Some("Show word size and byte order of the kernel")
    }

    fn contract(&self) -> &ArgumentContract {
        &self.contract
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &ArgMatches) -> Result<(), CommandFailure> {
        if !ctx.session.is_linux_kernel() {
            return Err(CommandFailure::failed("target is not a Linux kernel"));
        }
        writeln!(ctx.out, "word size:  {} bytes", ctx.session.word_size())?;
        writeln!(ctx.out, "byte order: {}", ctx.session.endian().as_str())?;
        Ok(())
    }
}
