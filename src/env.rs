use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, shell-level view of the process state used by builtins and the
/// interactive loop.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The current working directory, mirrored from the process so the loop
    /// never has to re-query it.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            should_exit: false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_captures_the_working_directory() {
        let env = Environment::new();
        // another test may chdir concurrently, so only shape is asserted
        assert!(env.current_dir.is_absolute());
        assert!(!env.should_exit);
    }
}
