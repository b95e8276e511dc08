//! Command registration, parsing and dispatch for dbgsh.
//!
//! Commands are independent units behind the [`Command`] trait. The startup
//! sequence registers them into a [`CommandRegistry`], which the
//! [`Dispatcher`] then uses to resolve and run command lines.

pub mod command;
pub mod contract;
pub mod dispatcher;
pub mod handlers;
pub mod registry;
pub mod tokenizer;

pub use command::{Command, CommandContext, CommandError, CommandFailure, ControlAction};
pub use contract::{ArgumentContract, HelpLocator, ParseFailure, HELP_DIR_ENV};
pub use dispatcher::{Dispatcher, NoSuchCommand};
pub use handlers::load_commands;
pub use registry::{CommandPack, CommandRegistry, RegistryError};
pub use tokenizer::{strip_comment, tokenize, TokenizeError};
