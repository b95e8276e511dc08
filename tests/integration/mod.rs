//! Integration tests for dbgsh.
//!
//! Everything runs against `MockSession` and a recording script evaluator;
//! no live process is needed.

pub mod commands_test;
pub mod common;
pub mod console_test;
pub mod dispatch_test;
pub mod help_test;
