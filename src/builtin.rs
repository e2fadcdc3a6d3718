use crate::env::Environment;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::path::PathBuf;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Built-in commands executed in-process, without forking a child.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`), so `cd --help`
/// and malformed invocations are handled uniformly.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Executes the command against the shell environment.
    fn execute(self, env: &mut Environment) -> Result<ExitCode>;
}

fn run<T: BuiltinCommand>(name: &str, args: &[&str], env: &mut Environment) -> Result<ExitCode> {
    match T::from_args(&[name], args) {
        Ok(cmd) => cmd.execute(env),
        // --help lands here as well as parse errors
        Err(EarlyExit { output, status }) => {
            println!("{output}");
            Ok(if status.is_err() { 1 } else { 0 })
        }
    }
}

/// Dispatch `name` to a builtin, or `None` when it is an external command.
pub fn try_builtin(env: &mut Environment, name: &str, args: &[&str]) -> Option<Result<ExitCode>> {
    if name == Cd::name() {
        return Some(run::<Cd>(name, args, env));
    }
    if name == Exit::name() {
        return Some(run::<Exit>(name, args, env));
    }
    None
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME
/// environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, env: &mut Environment) -> Result<ExitCode> {
        let target = match self.target {
            Some(dir) => PathBuf::from(dir),
            None => stdenv::var("HOME").map(PathBuf::from).context("HOME is not set")?,
        };
        stdenv::set_current_dir(&target)
            .with_context(|| format!("cd: {}", target.display()))?;
        // children inherit the process cwd, so the process is the source of
        // truth and the environment just mirrors it
        env.current_dir = stdenv::current_dir().unwrap_or(target);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell once the remaining jobs have finished.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_not_builtins() {
        let mut env = Environment::new();
        assert!(try_builtin(&mut env, "ls", &[]).is_none());
        assert!(try_builtin(&mut env, "sleep", &["1"]).is_none());
    }

    #[test]
    fn exit_flags_the_environment() {
        let mut env = Environment::new();
        let code = try_builtin(&mut env, "exit", &[]).unwrap().unwrap();
        assert_eq!(code, 0);
        assert!(env.should_exit);
    }

    #[test]
    fn cd_moves_the_process_and_the_environment() {
        let mut env = Environment::new();
        let original = env.current_dir.clone();
        let target = stdenv::temp_dir();

        let code = try_builtin(&mut env, "cd", &[&target.to_string_lossy()])
            .unwrap()
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(env.current_dir, stdenv::current_dir().unwrap());

        // put the test process back where it started
        stdenv::set_current_dir(&original).unwrap();
    }

    #[test]
    fn cd_to_a_missing_directory_fails() {
        let mut env = Environment::new();
        let before = env.current_dir.clone();

        let result = try_builtin(&mut env, "cd", &["/definitely/not/a/real/dir"]).unwrap();
        assert!(result.is_err());
        assert_eq!(env.current_dir, before);
    }
}
