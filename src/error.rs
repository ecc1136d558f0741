//! Error taxonomy for the install/uninstall flows.
//!
//! External-command failures keep the child's exit code so the binary can
//! exit with it. Everything else maps to a generic failure code.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendKind;

/// Failure of an external process.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", describe_code(.code))]
    Exit { command: String, code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl CommandError {
    /// Exit code to report for this failure. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Exit {
                code: Some(code), ..
            } if *code != 0 => *code,
            CommandError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                127
            }
            _ => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("could not bootstrap AUR helper {backend}")]
    Bootstrap {
        backend: BackendKind,
        #[source]
        source: CommandError,
    },

    #[error("failed to install package '{package}'")]
    Install {
        package: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to query package '{package}'")]
    Query {
        package: String,
        #[source]
        source: CommandError,
    },

    #[error("{action} {}", .path.display())]
    Resource {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{0}")]
    Config(String),
}

impl SetupError {
    pub(crate) fn resource(
        action: &'static str,
        path: &std::path::Path,
        source: anyhow::Error,
    ) -> Self {
        SetupError::Resource {
            action,
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// The command failure at the root of this error, if any.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            SetupError::Bootstrap { source, .. }
            | SetupError::Install { source, .. }
            | SetupError::Query { source, .. } => Some(source),
            SetupError::Command(source) => Some(source),
            SetupError::Resource { .. } | SetupError::Config(_) => None,
        }
    }
}

/// Map an error chain to a process exit code.
///
/// The first external-command failure found in the chain wins; anything
/// else is reported as 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(command) = cause.downcast_ref::<CommandError>() {
            return command.exit_code();
        }
        if let Some(command) = cause
            .downcast_ref::<SetupError>()
            .and_then(SetupError::command_error)
        {
            return command.exit_code();
        }
    }
    1
}
