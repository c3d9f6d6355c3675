//! The interactive read, dispatch, wait, report loop.

use crate::PROGRAM_NAME;
use crate::builtin::{Dispatcher, ExitCode};
use crate::env::Environment;
use crate::launcher::{LaunchPolicy, Launcher};
use crate::supervisor;
use crate::tokenizer::{self, TokenizeError};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

/// Prompt written before each read.
pub const PROMPT: &str = "$ ";

/// Upper bound, in bytes, on a single input line after terminator removal.
/// Longer lines are rejected and the loop continues.
pub const MAX_LINE_LENGTH: usize = 1024;

/// The interpreter's prompt, read, dispatch, wait, report cycle.
///
/// Generic over its input and output streams so the loop can be driven from
/// in-memory buffers in tests. At most one child process is outstanding at
/// any time; the blocking wait in [`supervisor`] suspends the whole loop
/// until that child terminates.
///
/// The loop ends in exactly two ways: end-of-input (status 0) or the `exit`
/// builtin (its requested status). Unrecoverable failures propagate as
/// errors instead; the caller reports them and exits with status 1.
pub struct Repl<R, W> {
    input: R,
    output: W,
    env: Environment,
    builtins: Dispatcher,
    launcher: Launcher,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    /// Create a loop over the given streams with the default builtins.
    pub fn new(input: R, output: W, policy: LaunchPolicy) -> Self {
        Self {
            input,
            output,
            env: Environment::new(),
            builtins: Dispatcher::default(),
            launcher: Launcher::new(policy),
        }
    }

    /// Drive the loop until end-of-input or an exit request.
    pub fn run(&mut self) -> Result<ExitCode> {
        loop {
            self.prompt()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => {
                    // End of input: finish the prompt's line and shut down.
                    writeln!(self.output).context("write")?;
                    return Ok(0);
                }
            };

            if line.len() > MAX_LINE_LENGTH {
                eprintln!(
                    "{}: line too long: {} bytes (limit {})",
                    PROGRAM_NAME,
                    line.len(),
                    MAX_LINE_LENGTH
                );
                continue;
            }

            let argv = tokenizer::split_into_args(&line)?;
            if argv.is_empty() {
                continue;
            }
            let argv = self.expand_alias(argv)?;
            if argv.is_empty() {
                continue;
            }

            if let Some(result) = self.builtins.dispatch(&mut self.env, &mut self.output, &argv) {
                let status = result?;
                debug!(name = %argv[0], status, "builtin finished");
                if let Some(code) = self.env.pending_exit {
                    return Ok(code);
                }
                continue;
            }

            match self.launcher.launch(&self.env, &line, &argv) {
                Ok(child) => {
                    let outcome = supervisor::wait_for_child(child)?;
                    supervisor::report(outcome, &mut self.output).context("write")?;
                }
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => eprintln!("{}: {}", PROGRAM_NAME, err),
            }
        }
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.output, "{}", PROMPT).context("write")?;
        self.output.flush().context("flush")?;
        Ok(())
    }

    /// Read one line, normalized to carry no trailing terminator.
    ///
    /// Returns `None` on end-of-input. An empty line is a valid value and is
    /// distinct from end-of-input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("read")?;
        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Replace an aliased first token with the tokenization of its value.
    ///
    /// One pass only; aliases do not expand recursively. The token cap
    /// applies to the expanded vector as well.
    fn expand_alias(&self, mut argv: Vec<String>) -> Result<Vec<String>, TokenizeError> {
        let Some(value) = self.env.get_alias(&argv[0]) else {
            return Ok(argv);
        };
        let mut expanded = tokenizer::split_into_args(value)?;
        expanded.extend(argv.drain(1..));
        if expanded.len() > tokenizer::MAX_ARGS {
            return Err(TokenizeError::TooManyArguments(expanded.len()));
        }
        Ok(expanded)
    }
}
