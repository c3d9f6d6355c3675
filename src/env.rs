use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, user-level view of the process state threaded through the
/// interpreter.
///
/// The environment contains:
/// - `vars`: environment variables that will be visible to executed commands.
/// - `aliases`: the name to value alias table maintained by the `alias` builtin.
/// - `current_dir`: the working directory for command execution.
/// - `pending_exit`: set by the `exit` builtin; the interactive loop checks it
///   after each builtin and terminates with the stored status.
///
/// Note: fields are public for simplicity to keep the crate small.
/// Production code would prefer accessor methods over public fields.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// Alias definitions, consulted once per line for the first token.
    pub aliases: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set, the interactive loop exits with this status.
    pub pending_exit: Option<i32>,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// Variables are copied from `std::env::vars()` once; afterwards the map is
    /// the single source of truth for child environments, so `unsetenv` stays
    /// visible to children even though the interpreter's own environ block is
    /// never touched.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        for (k, v) in stdenv::vars() {
            vars.insert(k, v);
        }
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            aliases: HashMap::new(),
            current_dir,
            pending_exit: None,
        }
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Remove a variable, returning its previous value if it was set.
    pub fn unset_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Define or replace an alias.
    pub fn set_alias(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.aliases.insert(name.into(), value.into());
    }

    /// Look up an alias value by name.
    pub fn get_alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::collections::HashMap;
    use std::env as stdenv;

    fn empty_env() -> Environment {
        Environment {
            vars: HashMap::new(),
            aliases: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
            pending_exit: None,
        }
    }

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = empty_env();

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_unset_var() {
        let mut env = empty_env();

        env.set_var("KEY", "VALUE");
        assert_eq!(env.unset_var("KEY"), Some("VALUE".to_string()));
        assert_eq!(env.get_var("KEY"), None);

        // unsetting an absent variable is not an error
        assert_eq!(env.unset_var("KEY"), None);
    }

    #[test]
    fn test_env_captures_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert_eq!(env.pending_exit, None);
    }

    #[test]
    fn test_unset_is_not_resurrected_by_process_env() {
        let mut env = Environment::new();
        assert!(env.get_var("PATH").is_some());

        env.unset_var("PATH");

        // the process still has PATH set, but the captured view does not
        assert!(stdenv::var("PATH").is_ok());
        assert_eq!(env.get_var("PATH"), None);
    }

    #[test]
    fn test_alias_set_and_get() {
        let mut env = empty_env();

        assert_eq!(env.get_alias("ll"), None);
        env.set_alias("ll", "ls -l");
        assert_eq!(env.get_alias("ll"), Some("ls -l"));

        env.set_alias("ll", "ls -la");
        assert_eq!(env.get_alias("ll"), Some("ls -la"));
    }
}
