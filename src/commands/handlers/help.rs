//! `help [command]...`: list commands or show help for specific ones.

use crate::commands::command::{Command, CommandContext, CommandFailure};
use crate::commands::contract::ArgumentContract;
use clap::{Arg, ArgMatches};
use std::io::Write;

const NO_SUMMARY: &str = "no help text provided";

pub struct HelpCommand {
    contract: ArgumentContract,
}

impl HelpCommand {
    pub fn new() -> Self {
        let parser = clap::Command::new("help")
            .about("Display help for commands")
            .arg(
                Arg::new("commands")
                    .num_args(0..)
                    .value_name("COMMAND")
                    .help("Commands to show help for"),
            );
        Self {
            contract: ArgumentContract::new(parser),
        }
    }
}

impl Default for HelpCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn summary(&self) -> Option<&str> {
        Some("Display help for commands")
    }

    fn contract(&self) -> &ArgumentContract {
        &self.contract
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ArgMatches) -> Result<(), CommandFailure> {
        let requested: Vec<&String> = args
            .get_many::<String>("commands")
            .map(|names| names.collect())
            .unwrap_or_default();

        if requested.is_empty() {
            writeln!(ctx.out, "Available commands:")?;
            for (name, command) in ctx.registry.all() {
                let summary = command
                    .summary()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(NO_SUMMARY);
                writeln!(ctx.out, "{:<15} - {}", name, summary)?;
            }
            return Ok(());
        }

        for name in requested {
            let command = ctx
                .registry
                .lookup(name)
                .ok_or_else(|| CommandFailure::failed(format!("No such command `{name}'")))?;
            let text = command.format_help(ctx.help);
            writeln!(ctx.out, "{}", text.trim())?;
        }
        Ok(())
    }
}
