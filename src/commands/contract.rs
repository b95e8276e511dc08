//! Argument contracts for commands.
//!
//! Every command declares its arguments as a `clap::Command` builder wrapped
//! in an [`ArgumentContract`]. Parsing never prints and never exits: malformed
//! input comes back as a [`ParseFailure`] carrying the message and a usage
//! line, and the invoke boundary decides what to show.

use clap::error::ErrorKind;
use clap::{ArgMatches, ColorChoice};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the help-text base directory.
pub const HELP_DIR_ENV: &str = "DBGSH_HELP";

/// Prefix used when no help file exists for a command.
const GENERIC_HELP_HEADER: &str = "Could not locate help file.\nGeneric help text follows.\n\n";

/// Failure to parse a command's arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The arguments do not satisfy the contract.
    #[error("{message}")]
    Invalid { message: String, usage: String },

    /// The user asked for help (`-h`/`--help`).
    #[error("help requested")]
    HelpRequested,
}

/// Declared arguments for one command.
#[derive(Debug, Clone)]
pub struct ArgumentContract {
    parser: clap::Command,
}

impl ArgumentContract {
    /// Wraps a clap builder, configuring it for in-console use.
    pub fn new(parser: clap::Command) -> Self {
        let parser = parser
            .no_binary_name(true)
            .disable_version_flag(true)
            .color(ColorChoice::Never);
        Self { parser }
    }

    /// A contract that accepts no arguments.
    pub fn empty(name: &'static str) -> Self {
        Self::new(clap::Command::new(name))
    }

    /// The command name the contract was declared with.
    pub fn name(&self) -> &str {
        self.parser.get_name()
    }

    /// Parses argument tokens (without the command name).
    pub fn parse<I, T>(&self, tokens: I) -> Result<ArgMatches, ParseFailure>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        self.parser
            .clone()
            .try_get_matches_from(tokens)
            .map_err(|err| match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    ParseFailure::HelpRequested
                }
                _ => ParseFailure::Invalid {
                    message: first_error_line(&err.to_string()),
                    usage: self.usage(),
                },
            })
    }

    /// One-line usage string, e.g. `Usage: source <PATH> [ARGS]...`.
    pub fn usage(&self) -> String {
        self.parser.clone().render_usage().to_string()
    }

    /// Generic help synthesized from the declared arguments.
    pub fn generic_help(&self) -> String {
        self.parser.clone().render_help().to_string()
    }

    /// Full help text: the external help file when present, otherwise a
    /// generic block built from the declared arguments.
    pub fn format_help(&self, locator: &HelpLocator) -> String {
        match locator.load(self.name()) {
            Some(text) => text,
            None => format!("{GENERIC_HELP_HEADER}{}", self.generic_help()),
        }
    }
}

/// Extracts the first paragraph of a clap error as one line, without the
/// `error: ` prefix and the trailing usage/tip sections.
fn first_error_line(rendered: &str) -> String {
    let paragraph: Vec<&str> = rendered
        .lines()
        .take_while(|l| !l.trim().is_empty())
        .map(str::trim)
        .collect();
    let joined = paragraph.join(" ");
    joined
        .strip_prefix("error: ")
        .unwrap_or(&joined)
        .to_string()
}

/// Finds external help files: `<base>/commands/<name>.txt`.
#[derive(Debug, Clone, Default)]
pub struct HelpLocator {
    base: Option<PathBuf>,
}

impl HelpLocator {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Locator configured from the `DBGSH_HELP` environment variable.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os(HELP_DIR_ENV).map(PathBuf::from))
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Path where help for `name` would live, if a base is configured.
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        self.base
            .as_ref()
            .map(|base| base.join("commands").join(format!("{name}.txt")))
    }

    /// Loads help for `name`; absence of the base or the file is not an error.
    pub fn load(&self, name: &str) -> Option<String> {
        let path = self.path_for(name)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("No help file at {}: {e}", path.display());
                None
            }
        }
    }
}
