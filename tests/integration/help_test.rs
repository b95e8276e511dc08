//! Help listing and external help files.

use super::common::{dispatcher_for, run_line};
use dbgsh::session::MockSession;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

const GENERIC_HEADER: &str = "Could not locate help file.\nGeneric help text follows.\n\n";

fn help_dir_with(name: &str, text: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let commands = dir.path().join("commands");
    std::fs::create_dir_all(&commands).unwrap();
    std::fs::write(commands.join(format!("{name}.txt")), text).unwrap();
    dir
}

#[test]
fn test_help_lists_every_name_sorted() {
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "help"),
        "Available commands:\n\
         exit            - Leave the console\n\
         help            - Display help for commands\n\
         quit            - Leave the console\n\
         rd              - Read and display target memory\n\
         source          - Run a script file against the session\n\
         whatis          - Show the size and kind of a type\n"
    );
}

#[test]
fn test_help_file_is_printed_verbatim() {
    let dir = help_dir_with("rd", "rd ADDRESS [COUNT]\n\n  Dumps memory.\n");
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, Some(PathBuf::from(dir.path())));

    assert_eq!(
        run_line(&dispatcher, &mut session, "help rd"),
        "rd ADDRESS [COUNT]\n\n  Dumps memory.\n"
    );
}

#[test]
fn test_help_flag_uses_same_text() {
    let dir = help_dir_with("rd", "rd ADDRESS [COUNT]\n");
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, Some(PathBuf::from(dir.path())));

    assert_eq!(
        run_line(&dispatcher, &mut session, "rd --help"),
        "rd ADDRESS [COUNT]\n"
    );
}

#[test]
fn test_missing_help_file_falls_back_to_generic() {
    let dir = help_dir_with("rd", "only rd has a file\n");
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, Some(PathBuf::from(dir.path())));

    let printed = run_line(&dispatcher, &mut session, "help whatis");
    assert!(printed.starts_with(GENERIC_HEADER), "got: {printed}");
    assert!(printed.contains("<TYPE>"));
}

#[test]
fn test_no_help_dir_falls_back_to_generic() {
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, None);

    let printed = run_line(&dispatcher, &mut session, "source -h");
    assert!(printed.starts_with(GENERIC_HEADER), "got: {printed}");
}

#[test]
fn test_help_for_unknown_command() {
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "help frobnicate"),
        "help: No such command `frobnicate'\n"
    );
}
