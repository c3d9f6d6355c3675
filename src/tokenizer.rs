//! Splitting input lines into argument vectors.

use std::fmt;

/// Upper bound on the number of tokens a single line may produce.
pub const MAX_ARGS: usize = 64;

/// Characters that separate arguments: space, tab, carriage return, newline
/// and bell, the classic shell delimiter set.
const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// Errors that can occur while splitting a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// The line produced more than [`MAX_ARGS`] tokens. This is a
    /// configuration error for the whole interpreter, not a per-command one.
    TooManyArguments(usize),
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::TooManyArguments(count) => {
                write!(f, "too many arguments: {} (limit {})", count, MAX_ARGS)
            }
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Split a line into an argument vector.
///
/// Runs of delimiter characters collapse into a single separator and empty
/// fields are discarded, so an empty or all-whitespace line yields an empty
/// vector. The caller treats an empty vector as "nothing to do", never as a
/// command.
pub fn split_into_args(line: &str) -> Result<Vec<String>, TokenizeError> {
    let args: Vec<String> = line
        .split(DELIMITERS.as_slice())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect();
    if args.len() > MAX_ARGS {
        return Err(TokenizeError::TooManyArguments(args.len()));
    }
    Ok(args)
}
