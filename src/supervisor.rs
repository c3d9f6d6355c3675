//! Waiting on child processes and decoding their termination status.

use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Child, ExitStatus};
use tracing::debug;

/// Decoded termination status of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with the given code (0..=255 on POSIX).
    Exited(i32),
    /// Terminated by the given signal number.
    Signaled(i32),
    /// The platform reported neither an exit code nor a signal.
    Unknown,
}

impl ExitOutcome {
    /// Decode a raw wait status.
    pub fn decode(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Exited(code);
        }
        match termination_signal(status) {
            Some(signal) => ExitOutcome::Signaled(signal),
            None => ExitOutcome::Unknown,
        }
    }
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    ExitStatusExt::signal(&status)
}

#[cfg(not(unix))]
fn termination_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Block until the child terminates, then decode its status.
///
/// Takes the handle by value: a waited-on child has no successor states, so
/// the handle cannot be waited on a second time. A wait failure is
/// unrecoverable and propagates to the caller.
pub fn wait_for_child(mut child: Child) -> Result<ExitOutcome> {
    let status = child.wait().context("waitpid")?;
    let outcome = ExitOutcome::decode(status);
    debug!(?outcome, "child terminated");
    Ok(outcome)
}

/// Report an outcome on the interpreter's output stream.
///
/// Normal exits always report their code. Signal terminations are reported
/// as well; an `Unknown` outcome produces no user-visible line.
pub fn report(outcome: ExitOutcome, out: &mut dyn Write) -> std::io::Result<()> {
    match outcome {
        ExitOutcome::Exited(code) => writeln!(out, "Child exited with status {}", code),
        ExitOutcome::Signaled(signal) => writeln!(out, "Child terminated by signal {}", signal),
        ExitOutcome::Unknown => {
            debug!("child produced a status that is neither an exit code nor a signal");
            Ok(())
        }
    }
}
