//! Built-in commands run through the dispatcher against a mock session.

use super::common::{dispatcher_for, run_line};
use dbgsh::session::{Endian, MockSession, TypeKind};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_rd_word_dump() {
    let mut session = MockSession::new().with_memory(0x1000, b"Hello, world!!!!".to_vec());
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "rd -w 8 0x1000 2"),
        "0000000000001000:  77202c6f6c6c6548 212121216c64726f  Hello, world!!!!\n"
    );
}

#[test]
fn test_rd_bytes_wrap_rows() {
    let bytes: Vec<u8> = (0x41..0x41 + 18).collect();
    let mut session = MockSession::new().with_memory(0x20, bytes);
    let dispatcher = dispatcher_for(&session, None);

    let printed = run_line(&dispatcher, &mut session, "rd -w 1 32 18");
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "0000000000000020:  41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50  ABCDEFGHIJKLMNOP"
    );
    assert_eq!(
        lines[1],
        format!("0000000000000030:  {:<47}  QR", "51 52")
    );
}

#[test]
fn test_rd_big_endian_units() {
    let mut session = MockSession::new()
        .with_memory(0x10, vec![0x12, 0x34, 0x56, 0x78])
        .with_endian(Endian::Big);
    let dispatcher = dispatcher_for(&session, None);

    let printed = run_line(&dispatcher, &mut session, "rd --width 2 0x10 2");
    assert!(printed.starts_with("0000000000000010:  1234 5678 "), "got: {printed}");
}

#[test]
fn test_rd_rejects_bad_width() {
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, None);

    let printed = run_line(&dispatcher, &mut session, "rd -w 3 0x10");
    assert!(printed.starts_with("rd: "), "got: {printed}");
    assert!(printed.contains("Usage: rd"));
}

#[test]
fn test_rd_unreadable_memory() {
    let mut session = MockSession::new().with_memory(0x1000, vec![0u8; 4]);
    let dispatcher = dispatcher_for(&session, None);

    let printed = run_line(&dispatcher, &mut session, "rd -w 8 0x1000");
    assert_eq!(printed, "rd: short read at 0x1000: got 4 of 8 bytes\n");
}

#[test]
fn test_rd_last_word_of_address_space() {
    let mut session = MockSession::new().with_memory(0xffff_ffff_ffff_fff8, b"topmost!".to_vec());
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "rd -w 8 0xfffffffffffffff8 1"),
        format!("fffffffffffffff8:  2174736f6d706f74 {:16}  topmost!\n", "")
    );
}

#[test]
fn test_rd_rows_ending_at_top_of_address_space() {
    let bytes: Vec<u8> = (0x41..0x41 + 32).collect();
    let mut session = MockSession::new().with_memory(0xffff_ffff_ffff_ffe0, bytes);
    let dispatcher = dispatcher_for(&session, None);

    let printed = run_line(&dispatcher, &mut session, "rd -w 8 0xffffffffffffffe0 4");
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 2, "got: {printed}");
    assert!(lines[0].starts_with("ffffffffffffffe0:  "));
    assert!(lines[1].starts_with("fffffffffffffff0:  "));
    assert!(lines[1].ends_with("QRSTUVWXYZ[\\]^_`"));
}

#[test]
fn test_rd_past_top_of_address_space_wraps() {
    let mut session = MockSession::new().with_memory(0xffff_ffff_ffff_fff8, vec![0u8; 8]);
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "rd -w 8 0xfffffffffffffff8 2"),
        "rd: address range wraps around\n"
    );
}

#[test]
fn test_whatis_known_and_unknown() {
    let mut session = MockSession::new().with_type("unsigned long", 8, TypeKind::Integer);
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "whatis unsigned long"),
        "type = unsigned long (integer, 8 bytes)\n"
    );
    assert_eq!(
        run_line(&dispatcher, &mut session, "whatis struct nope"),
        "whatis: no type named `struct nope'\n"
    );
}

#[test]
fn test_source_runs_script_with_args() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("walk.py");
    std::fs::write(&script, "print('hi')\n").unwrap();

    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, None);
    let line = format!("source '{}' out.txt --depth 2", script.display());

    assert_eq!(run_line(&dispatcher, &mut session, &line), "");
    assert_eq!(session.scripts().len(), 1);
    assert_eq!(session.scripts()[0].path, script);
    assert_eq!(session.scripts()[0].args, vec!["out.txt", "--depth", "2"]);
}

#[test]
fn test_source_missing_file() {
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "source /definitely/not/here.py"),
        "source: No such file: /definitely/not/here.py\n"
    );
    assert!(session.scripts().is_empty());
}

#[test]
fn test_source_script_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("bad.py");
    std::fs::write(&script, "raise SystemExit(2)\n").unwrap();

    let mut session = MockSession::new().with_script_failure("exit status 2");
    let dispatcher = dispatcher_for(&session, None);
    let printed = run_line(&dispatcher, &mut session, &format!("source {}", script.display()));

    assert_eq!(
        printed,
        format!("source: script {} failed: exit status 2\n", script.display())
    );
}

#[test]
fn test_kernel_info_on_kernel_target() {
    let mut session = MockSession::new().as_kernel();
    let dispatcher = dispatcher_for(&session, None);

    assert_eq!(
        run_line(&dispatcher, &mut session, "kernel-info"),
        "word size:  8 bytes\nbyte order: little-endian\n"
    );
}

#[test]
fn test_kernel_info_absent_for_user_targets() {
    let mut session = MockSession::new();
    let dispatcher = dispatcher_for(&session, None);
    let mut out = Vec::new();

    assert!(dispatcher.run(&mut session, &mut out, "kernel-info").is_err());
}
