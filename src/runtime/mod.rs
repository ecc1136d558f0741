//! Runtime abstraction for system operations.
//!
//! Every side effect the installer has goes through the [`Runtime`] trait so
//! the install and uninstall flows can be exercised against a mock.
//!
//! # Structure
//!
//! - `path` - Path utility functions (normalize, is_path_under, rebase)
//! - `env` - Environment variables, directories and privilege
//! - `fs` - File system operations (copy, remove, permissions, access)
//! - `process` - External command execution
//! - `user` - User interaction (confirmation and choice prompts)

mod env;
mod fs;
pub mod path;
mod process;
mod user;

use anyhow::Result;
use log::trace;
use std::env as std_env;
use std::path::{Path, PathBuf};

use crate::error::CommandError;

pub use path::{is_path_under, rebase_under};
pub use process::CommandSpec;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Set file permissions (mode) on Unix systems. No-op elsewhere.
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;

    /// Whether the current user may write `path`, judged on the path itself
    /// or, when it does not exist yet, on its nearest existing ancestor.
    fn can_write(&self, path: &Path) -> bool;

    // Processes
    /// Run a command with inherited stdio, failing on a non-zero exit.
    fn run(&self, command: &CommandSpec) -> Result<(), CommandError>;

    /// Run a command silently and report whether it succeeded.
    fn probe(&self, command: &CommandSpec) -> Result<bool, CommandError>;

    // Directories
    fn cache_dir(&self) -> Option<PathBuf>;

    // Privilege
    fn is_privileged(&self) -> bool;

    // User interaction
    /// Prompt user for confirmation. Returns true if user confirms (y/yes), false otherwise.
    fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Prompt user for a free-form answer. Returns the trimmed line (empty on EOF).
    fn prompt(&self, prompt: &str) -> Result<String>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.copy_impl(from, to)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.set_permissions_impl(path, mode)
    }

    fn can_write(&self, path: &Path) -> bool {
        self.can_write_impl(path)
    }

    fn run(&self, command: &CommandSpec) -> Result<(), CommandError> {
        self.run_impl(command)
    }

    fn probe(&self, command: &CommandSpec) -> Result<bool, CommandError> {
        self.probe_impl(command)
    }

    fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir_impl()
    }

    fn is_privileged(&self) -> bool {
        self.is_privileged_impl()
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.confirm_impl(prompt)
    }

    fn prompt(&self, prompt: &str) -> Result<String> {
        self.prompt_impl(prompt)
    }
}

/// Locate an executable by name on `PATH`, the way a shell's `command -v` would.
pub fn find_executable<R: Runtime + ?Sized>(runtime: &R, name: &str) -> Option<PathBuf> {
    let search_path = runtime.env_var("PATH").ok()?;
    for dir in std_env::split_paths(&search_path) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);
        trace!("Looking for {} at {:?}", name, candidate);
        if runtime.is_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_find_executable_first_match_wins() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq("PATH"))
            .returning(|_| Ok("/usr/local/bin:/usr/bin".to_string()));
        runtime
            .expect_is_file()
            .with(eq(PathBuf::from("/usr/local/bin/paru")))
            .returning(|_| false);
        runtime
            .expect_is_file()
            .with(eq(PathBuf::from("/usr/bin/paru")))
            .returning(|_| true);

        assert_eq!(
            find_executable(&runtime, "paru"),
            Some(PathBuf::from("/usr/bin/paru"))
        );
    }

    #[test]
    fn test_find_executable_not_found() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq("PATH"))
            .returning(|_| Ok("/usr/bin".to_string()));
        runtime.expect_is_file().returning(|_| false);

        assert_eq!(find_executable(&runtime, "yay"), None);
    }

    #[test]
    fn test_find_executable_without_path_variable() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq("PATH"))
            .returning(|_| Err(std_env::VarError::NotPresent));

        assert_eq!(find_executable(&runtime, "viu"), None);
    }

    #[test]
    fn test_find_executable_skips_empty_entries() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq("PATH"))
            .returning(|_| Ok(":/usr/bin".to_string()));
        runtime
            .expect_is_file()
            .with(eq(PathBuf::from("/usr/bin/viu")))
            .times(1)
            .returning(|_| true);

        assert_eq!(
            find_executable(&runtime, "viu"),
            Some(PathBuf::from("/usr/bin/viu"))
        );
    }
}
