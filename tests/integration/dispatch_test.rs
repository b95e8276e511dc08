//! Registry and dispatcher behavior.

use super::common::{dispatcher_for, run_line};
use dbgsh::commands::{
    ArgumentContract, Command, CommandContext, CommandError, CommandFailure, CommandRegistry,
    ControlAction, Dispatcher, HelpLocator, ParseFailure,
};
use dbgsh::interrupt::InterruptFlag;
use dbgsh::session::MockSession;
use clap::ArgMatches;
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Raises the interrupt flag, then polls it like a long-running command.
struct Spin {
    contract: ArgumentContract,
}

impl Command for Spin {
    fn name(&self) -> &str {
        "spin"
    }

    fn contract(&self) -> &ArgumentContract {
        &self.contract
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &ArgMatches) -> Result<(), CommandFailure> {
        ctx.interrupt.raise();
        ctx.check_interrupt()?;
        unreachable!("interrupt was raised");
    }
}

#[test]
fn test_alias_resolves_to_same_instance() {
    let dispatcher = dispatcher_for(&MockSession::new(), None);
    let exit = dispatcher.registry().lookup("exit").unwrap();
    let quit = dispatcher.registry().lookup("quit").unwrap();
    assert!(Arc::ptr_eq(&exit, &quit));
}

#[test]
fn test_lookup_is_exact() {
    let dispatcher = dispatcher_for(&MockSession::new(), None);
    assert!(dispatcher.registry().lookup("Help").is_none());
    assert!(dispatcher.registry().lookup("hel").is_none());
}

#[test]
fn test_empty_line_is_noop() {
    let dispatcher = dispatcher_for(&MockSession::new(), None);
    let mut session = MockSession::new();
    assert_eq!(run_line(&dispatcher, &mut session, ""), "");
    assert_eq!(run_line(&dispatcher, &mut session, " \t "), "");
}

#[test]
fn test_unknown_then_registered() {
    let mut dispatcher = dispatcher_for(&MockSession::new(), None);
    let mut session = MockSession::new();
    let mut out = Vec::new();

    let err = dispatcher
        .run(&mut session, &mut out, "nosuchcmd arg")
        .unwrap_err();
    assert_eq!(err.to_string(), "No command for input: nosuchcmd arg");

    let help = dispatcher.registry().lookup("help").unwrap();
    dispatcher
        .registry_mut()
        .register("nosuchcmd", help)
        .unwrap();
    let printed = run_line(&dispatcher, &mut session, "nosuchcmd rd");
    assert!(printed.starts_with("Could not locate help file."));
}

#[test]
fn test_exit_requests_control_action() {
    let dispatcher = dispatcher_for(&MockSession::new(), None);
    let mut session = MockSession::new();
    let mut out = Vec::new();
    let action = dispatcher.run(&mut session, &mut out, "quit").unwrap();
    assert_eq!(action, Some(ControlAction::Exit));
}

#[test]
fn test_parse_failure_prints_message_and_usage() {
    let dispatcher = dispatcher_for(&MockSession::new(), None);
    let mut session = MockSession::new();

    let printed = run_line(&dispatcher, &mut session, "rd");
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 2, "unexpected output: {printed}");
    assert!(lines[0].starts_with("rd: "));
    assert!(lines[0].contains("<ADDRESS>"));
    assert!(lines[1].starts_with("Usage: rd"));
}

#[test]
fn test_uncaught_invoke_surfaces_parse_failure() {
    let dispatcher = dispatcher_for(&MockSession::new(), None);
    let mut session = MockSession::new();
    let mut out = Vec::new();
    let rd = dispatcher.registry().lookup("rd").unwrap();

    let mut ctx = CommandContext {
        session: &mut session,
        registry: dispatcher.registry(),
        help: dispatcher.help(),
        out: &mut out,
        interrupt: dispatcher.interrupt(),
        control: None,
    };
    let err = rd
        .invoke_uncaught(&mut ctx, &["--bogus".to_string()])
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Parse(ParseFailure::Invalid { .. })
    ));
}

#[test]
fn test_command_failure_is_prefixed_with_name() {
    let dispatcher = dispatcher_for(&MockSession::new(), None);
    let mut session = MockSession::new();
    let printed = run_line(&dispatcher, &mut session, "rd 0x2000");
    assert!(printed.starts_with("rd: "), "unexpected output: {printed}");
}

#[test]
fn test_interrupt_is_swallowed_and_cleared() {
    let mut registry = CommandRegistry::new();
    registry
        .add(Arc::new(Spin {
            contract: ArgumentContract::empty("spin"),
        }))
        .unwrap();
    let interrupt = InterruptFlag::new();
    let dispatcher = Dispatcher::new(registry, HelpLocator::new(None), interrupt.clone());
    let mut session = MockSession::new();

    assert_eq!(run_line(&dispatcher, &mut session, "spin"), "");
    assert!(!interrupt.is_raised());
}
