//! Creation of child processes for non-builtin commands.

use crate::env::Environment;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use tracing::debug;

/// Path of the intermediate shell used by [`LaunchPolicy::ViaShell`].
const SHELL_PATH: &str = "/bin/sh";

/// How the launcher turns an input line into a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPolicy {
    /// Resolve the first token against PATH and execute it directly.
    Direct,
    /// Hand the raw line to `/bin/sh -c`.
    ViaShell,
}

/// Failure to create a child process.
///
/// Resolution failures and permission-class spawn failures belong to the
/// command that was attempted; everything else is resource exhaustion and
/// ends the interpreter. [`LaunchError::is_fatal`] encodes that split so the
/// caller can decide continue-vs-terminate at its own level.
#[derive(Debug)]
pub enum LaunchError {
    /// The command name could not be resolved to an executable.
    NotFound(String),
    /// The spawn call itself failed.
    Spawn {
        /// The program the spawn was attempted for.
        program: String,
        /// The underlying system error.
        source: io::Error,
    },
}

impl LaunchError {
    /// Whether this failure should terminate the whole interpreter.
    pub fn is_fatal(&self) -> bool {
        match self {
            LaunchError::NotFound(_) => false,
            LaunchError::Spawn { source, .. } => !matches!(
                source.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ),
        }
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::NotFound(name) => write!(f, "{}: command not found", name),
            LaunchError::Spawn { program, source } => write!(f, "{}: {}", program, source),
        }
    }
}

impl std::error::Error for LaunchError {}

/// Spawns child processes, parameterized by a [`LaunchPolicy`].
pub struct Launcher {
    policy: LaunchPolicy,
}

impl Launcher {
    /// Create a launcher with the given policy.
    pub fn new(policy: LaunchPolicy) -> Self {
        Self { policy }
    }

    /// Spawn a child process for a non-empty argument vector.
    ///
    /// `line` is the normalized input line the vector was built from; the
    /// intermediate-shell policy passes it through verbatim. The child
    /// receives exactly the environment's variable table and working
    /// directory; stdio is inherited from the interpreter.
    ///
    /// On success the calling process never sees the child's program logic,
    /// only its [`Child`] handle.
    pub fn launch(
        &self,
        env: &Environment,
        line: &str,
        argv: &[String],
    ) -> Result<Child, LaunchError> {
        let (program, mut command) = match self.policy {
            LaunchPolicy::Direct => {
                let search_paths = env.get_var("PATH").unwrap_or_default();
                let executable = find_command_path(OsStr::new(&search_paths), Path::new(&argv[0]))
                    .ok_or_else(|| LaunchError::NotFound(argv[0].clone()))?;
                let program = executable.display().to_string();
                let mut command = Command::new(executable.as_os_str());
                command.args(&argv[1..]);
                (program, command)
            }
            LaunchPolicy::ViaShell => {
                let mut command = Command::new(SHELL_PATH);
                command.arg("-c").arg(line);
                (SHELL_PATH.to_string(), command)
            }
        };
        command
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);
        debug!(%program, policy = ?self.policy, "spawning child");
        command.spawn().map_err(|source| LaunchError::Spawn {
            program,
            source,
        })
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Absolute paths and multi-component relative paths are used as given when
/// they exist; a `./`-prefixed path resolves against the current directory;
/// a single bare component is searched through each directory of
/// `search_paths` (PATH). An empty path never resolves.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(name), None) => find_in_path(search_paths, name.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
