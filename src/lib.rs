//! dbgsh - a scriptable debugger console.
//!
//! This library exposes the core modules for use in integration tests.

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod interrupt;
pub mod session;
