//! Console mode switching and end-of-input handling.

use super::common::{console_with, line, ScriptedSource};
use dbgsh::console::{ConsoleExit, ConsoleMode, QueuedSource, ReadOutcome, ReaderSource};
use dbgsh::session::MockSession;
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn output(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

#[test]
fn test_prompts_track_mode() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::new(
        true,
        vec![line("python"), line("x = 1"), line("end"), line("quit")],
    );
    let mut out = Vec::new();

    let exit = console.run(&mut source, &mut out).unwrap();
    assert_eq!(exit, ConsoleExit::ExitRequested);
    assert_eq!(source.prompts, vec!["cmd>>> ", ">>> ", ">>> ", "cmd>>> "]);
}

#[test]
fn test_script_lines_reach_evaluator_unchanged() {
    let (mut console, seen) = console_with(MockSession::new());
    let mut source = ScriptedSource::typed(&["python", "  y = 2  # note", "end  # back"]);
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    assert_eq!(*seen.borrow(), vec!["  y = 2  # note".to_string()]);
    assert_eq!(console.mode(), ConsoleMode::Command);
}

#[test]
fn test_comment_is_stripped_before_dispatch() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::typed(&["help  # show commands"]);
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    let printed = output(out);
    assert!(printed.starts_with("Available commands:\n"), "got: {printed}");
    assert!(printed.contains("rd              - Read and display target memory\n"));
}

#[test]
fn test_comment_only_line_is_noop() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::typed(&["   # just a note", ""]);
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    assert_eq!(output(out), "");
}

#[test]
fn test_unknown_command_keeps_console_running() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::typed(&["nosuchcmd arg", "quit", "help"]);
    let mut out = Vec::new();

    let exit = console.run(&mut source, &mut out).unwrap();
    assert_eq!(exit, ConsoleExit::ExitRequested);
    assert_eq!(output(out), "No command for input: nosuchcmd arg\n");
    assert_eq!(source.remaining(), 1);
}

#[test]
fn test_end_inside_open_construct_goes_to_evaluator() {
    let (mut console, seen) = console_with(MockSession::new());
    let mut source = ScriptedSource::typed(&["python", "loop {", "end", "}", "end"]);
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    assert_eq!(*seen.borrow(), vec!["loop {", "end", "}"]);
    assert_eq!(output(out), "evaluated block\n");
    assert_eq!(console.mode(), ConsoleMode::Command);
}

#[test]
fn test_python_keyword_in_script_mode_is_script_input() {
    let (mut console, seen) = console_with(MockSession::new());
    let mut source = ScriptedSource::typed(&["python", "python"]);
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    assert_eq!(*seen.borrow(), vec!["python"]);
}

#[test]
fn test_interactive_eof_soft_then_hard() {
    let (mut console, seen) = console_with(MockSession::new());
    let mut source = ScriptedSource::new(
        true,
        vec![
            line("python"),
            line("block {"),
            ReadOutcome::Eof,
            ReadOutcome::Eof,
            line("help"),
        ],
    );
    let mut out = Vec::new();

    let exit = console.run(&mut source, &mut out).unwrap();
    assert_eq!(exit, ConsoleExit::EndOfInput);
    assert_eq!(source.prompts, vec!["cmd>>> ", ">>> ", ">>> ", "cmd>>> "]);
    assert_eq!(source.remaining(), 1);
    assert_eq!(*seen.borrow(), vec!["block {"]);
    assert!(console.exit_pending());
}

#[test]
fn test_line_after_soft_eof_rearms_it() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::new(
        true,
        vec![
            line("python"),
            ReadOutcome::Eof,
            line("python"),
            ReadOutcome::Eof,
            line("help"),
            ReadOutcome::Eof,
        ],
    );
    let mut out = Vec::new();

    assert_eq!(
        console.run(&mut source, &mut out).unwrap(),
        ConsoleExit::EndOfInput
    );
    assert_eq!(source.remaining(), 0);
}

#[test]
fn test_interactive_eof_in_command_mode_terminates() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::new(true, vec![ReadOutcome::Eof, line("help")]);
    let mut out = Vec::new();

    assert_eq!(
        console.run(&mut source, &mut out).unwrap(),
        ConsoleExit::EndOfInput
    );
    assert_eq!(source.remaining(), 1);
}

#[test]
fn test_non_interactive_eof_terminates_in_script_mode() {
    let (mut console, seen) = console_with(MockSession::new());
    let mut source = ReaderSource::new(Cursor::new("python\nopen {\n"));
    let mut out = Vec::new();

    let exit = console.run(&mut source, &mut out).unwrap();
    assert_eq!(exit, ConsoleExit::EndOfInput);
    assert_eq!(console.mode(), ConsoleMode::Script);
    assert_eq!(*seen.borrow(), vec!["open {"]);
    assert_eq!(output(out), "");
}

#[test]
fn test_non_interactive_has_no_prompt() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::new(false, vec![line("python"), line("end")]);
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    assert!(source.prompts.iter().all(String::is_empty));
}

#[test]
fn test_ctrl_c_at_prompt_discards_construct() {
    let (mut console, seen) = console_with(MockSession::new());
    let mut source = ScriptedSource::new(
        true,
        vec![
            line("python"),
            line("block {"),
            ReadOutcome::Interrupted,
            line("end"),
        ],
    );
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    assert_eq!(*seen.borrow(), vec!["block {"]);
    assert_eq!(console.mode(), ConsoleMode::Command);
    assert_eq!(output(out), "^C\n");
}

#[test]
fn test_script_error_is_reported() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = ScriptedSource::typed(&["python", "fail", "end"]);
    let mut out = Vec::new();

    console.run(&mut source, &mut out).unwrap();
    assert_eq!(output(out), "script exited with status 1\n");
    assert_eq!(console.mode(), ConsoleMode::Command);
}

#[test]
fn test_batch_file_runs_commands() {
    let session = MockSession::new().with_memory(0x1000, b"Hello, world!!!!".to_vec());
    let (mut console, _) = console_with(session);
    let mut source = ReaderSource::new(Cursor::new("# dump\nrd -w 8 0x1000 2\nexit\nrd 0x1000\n"));
    let mut out = Vec::new();

    let exit = console.run(&mut source, &mut out).unwrap();
    assert_eq!(exit, ConsoleExit::ExitRequested);
    assert_eq!(
        output(out),
        "0000000000001000:  77202c6f6c6c6548 212121216c64726f  Hello, world!!!!\n"
    );
}

#[test]
fn test_queued_line_with_newline_is_one_line() {
    let (mut console, _) = console_with(MockSession::new());
    let mut source = QueuedSource::new(vec!["nosuchcmd\nexit".to_string()]);
    let mut out = Vec::new();

    let exit = console.run(&mut source, &mut out).unwrap();
    assert_eq!(exit, ConsoleExit::EndOfInput);
    assert_eq!(output(out), "No command for input: nosuchcmd\nexit\n");
}
