use crate::env::Environment;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Built-in commands known to the interpreter at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process, without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Executes the command against the provided output stream and environment.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

/// Object-safe form of a builtin invocation with its arguments already bound.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match BuiltinCommand::execute(*self, stdout, env) {
            Ok(code) => Ok(code),
            Err(err) => {
                eprintln!("{}: {:#}", crate::PROGRAM_NAME, err);
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}

/// Factory allows creating instances of ExecutableCommand for one builtin.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

/// Maps command names to in-process callables.
///
/// The interactive loop consults the dispatcher before falling back to the
/// process launcher. `None` from [`Dispatcher::dispatch`] means the name is
/// not a builtin.
pub struct Dispatcher {
    factories: Vec<Box<dyn CommandFactory>>,
}

impl Dispatcher {
    /// Create a dispatcher with a custom set of factories.
    pub fn new(factories: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { factories }
    }

    /// Look up the first token and, if it names a builtin, run it synchronously.
    ///
    /// Returns the builtin's exit status, or `None` when no factory recognizes
    /// the name. An empty argument vector is never a builtin.
    pub fn dispatch(
        &self,
        env: &mut Environment,
        stdout: &mut dyn Write,
        argv: &[String],
    ) -> Option<Result<ExitCode>> {
        let (name, rest) = argv.split_first()?;
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        for factory in &self.factories {
            if let Some(cmd) = factory.try_create(name, &args) {
                return Some(cmd.execute(stdout, env));
            }
        }
        None
    }
}

impl Default for Dispatcher {
    /// Create a dispatcher with every builtin this crate defines:
    /// `cd`, `env`, `exit`, `alias`, `setenv`, `unsetenv`.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Env>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Alias>::default()),
            Box::new(Factory::<Setenv>::default()),
            Box::new(Factory::<Unsetenv>::default()),
        ])
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => {
                if let Some(home) = env.get_var("HOME") {
                    PathBuf::from(home)
                } else {
                    return Err(anyhow::anyhow!("cd: no target and HOME not set"));
                }
            }
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;

        stdenv::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the environment, one NAME=VALUE pair per line, sorted by name.
pub struct Env {}

impl BuiltinCommand for Env {
    fn name() -> &'static str {
        "env"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let mut pairs: Vec<(&String, &String)> = env.vars.iter().collect();
        pairs.sort();
        for (name, value) in pairs {
            writeln!(stdout, "{}={}", name, value)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Terminate the interpreter with an optional status.
pub struct Exit {
    #[argh(positional)]
    /// exit status in 0..=255; defaults to 0 when omitted.
    pub status: Option<i32>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let status = self.status.unwrap_or(0);
        if !(0..=255).contains(&status) {
            return Err(anyhow::anyhow!("exit: {}: status out of range", status));
        }
        env.pending_exit = Some(status);
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Define or display aliases.
pub struct Alias {
    #[argh(positional, greedy)]
    /// name=value definitions or names to display; lists every alias when empty.
    pub entries: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        if self.entries.is_empty() {
            let mut names: Vec<&String> = env.aliases.keys().collect();
            names.sort();
            for name in names {
                writeln!(stdout, "{}='{}'", name, env.aliases[name])?;
            }
            return Ok(0);
        }

        let mut status = 0;
        for entry in &self.entries {
            match entry.split_once('=') {
                Some((name, value)) => env.set_alias(name, value),
                None => match env.get_alias(entry) {
                    Some(value) => writeln!(stdout, "{}='{}'", entry, value)?,
                    None => {
                        eprintln!("{}: alias: {}: not found", crate::PROGRAM_NAME, entry);
                        status = 1;
                    }
                },
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Set an environment variable for subsequently launched commands.
pub struct Setenv {
    #[argh(positional)]
    /// name of the variable.
    pub name: String,

    #[argh(positional)]
    /// value to assign.
    pub value: String,
}

impl BuiltinCommand for Setenv {
    fn name() -> &'static str {
        "setenv"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.set_var(self.name, self.value);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Remove a variable from the environment of subsequently launched commands.
pub struct Unsetenv {
    #[argh(positional)]
    /// name of the variable to remove.
    pub name: String,
}

impl BuiltinCommand for Unsetenv {
    fn name() -> &'static str {
        "unsetenv"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        // removing an absent variable succeeds, matching POSIX unsetenv
        env.unset_var(&self.name);
        Ok(0)
    }
}
