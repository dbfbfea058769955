//! The `xlang` command-line front end: run and list X bytecode programs,
//! and debug them interactively against their source.

pub mod commands;
pub mod console;

pub use console::{Command, ConsoleError, DebugConsole, SessionEnd};
