//! `whatis <type>`: look up a type by name.

use crate::commands::command::{Command, CommandContext, CommandFailure};
use crate::commands::contract::ArgumentContract;
use clap::{Arg, ArgMatches};
use std::io::Write;

pub struct WhatisCommand {
    contract: ArgumentContract,
}

impl WhatisCommand {
    pub fn new() -> Self {
        let parser = clap::Command::new("whatis")
            .about("Show the size and kind of a named type")
            .arg(
                Arg::new("type")
                    .required(true)
                    .num_args(1..)
                    .value_name("TYPE")
                    .help("Type name; multiple words are joined (e.g. unsigned long)"),
            );
        Self {
            contract: ArgumentContract::new(parser),
        }
    }
}

impl Default for WhatisCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for WhatisCommand {
    fn name(&self) -> &str {
        "whatis"
    }

    fn summary(&self) -> Option<&str> {
        Some("Show the size and kind of a type")
    }

    fn contract(&self) -> &ArgumentContract {
        &self.contract
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ArgMatches) -> Result<(), CommandFailure> {
        let name = args
            .get_many::<String>("type")
            .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        let info = ctx.session.find_type(&name)?;
        writeln!(
            ctx.out,
            "type = {} ({}, {} bytes)",
            info.name,
            info.kind.as_str(),
            info.size
        )?;
        Ok(())
    }
}
