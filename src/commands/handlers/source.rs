//! `source <path> [args]...`: run an external script against the session.

use crate::commands::command::{Command, CommandContext, CommandFailure};
use crate::commands::contract::ArgumentContract;
use clap::{Arg, ArgMatches};
use std::path::Path;
use tracing::info;

pub struct SourceCommand {
    contract: ArgumentContract,
}

impl SourceCommand {
    pub fn new() -> Self {
        let parser = clap::Command::new("source")
            .about("Load and execute a script file against the current session")
            .arg(
                Arg::new("path")
                    .required(true)
                    .value_name("PATH")
                    .help("Script to run"),
            )
            .arg(
                Arg::new("args")
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .value_name("ARGS")
                    .help("Arguments passed to the script"),
            );
        Self {
            contract: ArgumentContract::new(parser),
        }
    }
}

impl Default for SourceCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for SourceCommand {
    fn name(&self) -> &str {
        "source"
    }

    fn summary(&self) -> Option<&str> {
        Some("Run a script file against the session")
    }

    fn contract(&self) -> &ArgumentContract {
        &self.contract
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ArgMatches) -> Result<(), CommandFailure> {
        let path = args
            .get_one::<String>("path")
            .ok_or_else(|| CommandFailure::failed("missing script path"))?;
        let script_args: Vec<String> = args
            .get_many::<String>("args")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let path = Path::new(path);
        if !path.is_file() {
            return Err(CommandFailure::failed(format!(
                "No such file: {}",
                path.display()
            )));
        }

        info!("Sourcing {} {:?}", path.display(), script_args);
        ctx.session.run_script(path, &script_args)?;
        Ok(())
    }
}
