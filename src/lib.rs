//! A tiny interactive command interpreter.
//!
//! This crate provides a minimal set of building blocks around the classic
//! prompt, read, fork, exec, wait cycle: [`tokenizer`] splits an input line
//! into an argument vector, [`builtin`] runs the handful of commands that
//! execute in-process, [`launcher`] spawns everything else as a child
//! process, and [`supervisor`] waits for that child and decodes its
//! termination status. [`repl::Repl`] ties them together into the
//! interactive loop. It is intentionally small and easy to read, suitable
//! for experiments with process management and argument parsing.
//!
//! The interpreter state (variables, aliases, working directory) lives in an
//! explicit [`env::Environment`] value passed to the components that need
//! it; there are no process-wide globals.

pub mod builtin;
pub mod env;
pub mod launcher;
pub mod repl;
pub mod supervisor;
pub mod tokenizer;

/// Name used to prefix diagnostics on standard error.
pub const PROGRAM_NAME: &str = "hsh";

/// Just a convenient re-export of the interactive loop.
///
/// See [`repl::Repl`] for the high-level API.
pub use repl::Repl;
