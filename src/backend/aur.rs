//! AUR helper backends (paru, yay).

use log::{debug, warn};
use std::path::PathBuf;

use super::{BackendKind, PackageBackend};
use crate::error::SetupError;
use crate::runtime::{CommandSpec, Runtime, find_executable};

/// Packages `makepkg` needs before any AUR recipe can be built.
const BUILD_PREREQUISITES: [&str; 2] = ["git", "base-devel"];

/// An AUR helper driven through its command line.
pub struct AurHelper<'a, R: Runtime> {
    runtime: &'a R,
    kind: BackendKind,
}

impl<'a, R: Runtime> AurHelper<'a, R> {
    pub fn new(runtime: &'a R, kind: BackendKind) -> Self {
        Self { runtime, kind }
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(self.kind.executable())
    }

    /// Scratch directory the build recipe is cloned into.
    fn recipe_dir(&self) -> PathBuf {
        self.runtime
            .cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("viu-setup")
            .join(self.kind.executable())
    }

    fn bootstrap_step(&self, command: CommandSpec) -> Result<(), SetupError> {
        self.runtime
            .run(&command)
            .map_err(|source| SetupError::Bootstrap {
                backend: self.kind,
                source,
            })
    }
}

impl<R: Runtime> PackageBackend for AurHelper<'_, R> {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn is_present(&self) -> bool {
        let found = find_executable(self.runtime, self.kind.executable());
        debug!("{} found at {:?}", self.kind, found);
        found.is_some()
    }

    fn is_installed(&self, package: &str) -> Result<bool, SetupError> {
        self.runtime
            .probe(&self.command().args(["-Q", package]))
            .map_err(|source| SetupError::Query {
                package: package.to_string(),
                source,
            })
    }

    fn install(&self, package: &str) -> Result<(), SetupError> {
        self.runtime
            .run(
                &self
                    .command()
                    .args(["-S", "--needed", "--noconfirm", package]),
            )
            .map_err(|source| SetupError::Install {
                package: package.to_string(),
                source,
            })
    }

    #[tracing::instrument(skip(self), fields(backend = %self.kind))]
    fn bootstrap(&self) -> Result<(), SetupError> {
        let workdir = self.recipe_dir();
        if self.runtime.exists(&workdir) {
            debug!("Removing stale recipe checkout {:?}", workdir);
            self.runtime
                .remove_dir_all(&workdir)
                .map_err(|e| SetupError::resource("failed to clear", &workdir, e))?;
        }
        if let Some(parent) = workdir.parent() {
            self.runtime
                .create_dir_all(parent)
                .map_err(|e| SetupError::resource("failed to create", parent, e))?;
        }

        self.bootstrap_step(
            CommandSpec::new("pacman")
                .args(["-S", "--needed", "--noconfirm"])
                .args(BUILD_PREREQUISITES)
                .elevated(),
        )?;
        self.bootstrap_step(
            CommandSpec::new("git")
                .args(["clone", "--depth", "1"])
                .arg(self.kind.recipe_url())
                .path_arg(&workdir),
        )?;
        self.bootstrap_step(
            CommandSpec::new("makepkg")
                .args(["-si", "--noconfirm"])
                .current_dir(&workdir),
        )?;

        if let Err(e) = self.runtime.remove_dir_all(&workdir) {
            warn!("Failed to clean up {:?}: {}", workdir, e);
        }
        Ok(())
    }
}
