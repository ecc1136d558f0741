//! External command execution.

use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::RealRuntime;
use crate::error::CommandError;

/// A description of an external command to run.
///
/// Elevated commands are prefixed with `sudo` at the point they run, so each
/// privileged operation asks for credentials on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub elevated: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            elevated: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    /// Whether this runs `program` with exactly `args`.
    pub fn is(&self, program: &str, args: &[&str]) -> bool {
        self.program == program && self.args.iter().map(String::as_str).eq(args.iter().copied())
    }

    fn to_command(&self, privileged: bool) -> Command {
        let mut command = if self.elevated && !privileged {
            let mut sudo = Command::new("sudo");
            sudo.arg(&self.program);
            sudo
        } else {
            Command::new(&self.program)
        };
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elevated {
            write!(f, "sudo ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self, spec), fields(command = %spec))]
    pub(crate) fn run_impl(&self, spec: &CommandSpec) -> Result<(), CommandError> {
        debug!("Running {}", spec);
        let status = spec
            .to_command(self.is_privileged_impl())
            .status()
            .map_err(|source| CommandError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Exit {
                command: spec.to_string(),
                code: status.code(),
            })
        }
    }

    #[tracing::instrument(skip(self, spec), fields(command = %spec))]
    pub(crate) fn probe_impl(&self, spec: &CommandSpec) -> Result<bool, CommandError> {
        let status = spec
            .to_command(self.is_privileged_impl())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| CommandError::Spawn {
                command: spec.to_string(),
                source,
            })?;
        debug!("Probe {} -> {}", spec, status);
        Ok(status.success())
    }
}
