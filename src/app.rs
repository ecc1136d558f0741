//! Obtaining, building and installing the application itself.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::SetupError;
use crate::manifest::Manifest;
use crate::runtime::{CommandSpec, Runtime};

/// Where the application source lives for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTree {
    /// A checkout supplied by the user; left untouched.
    Local(PathBuf),
    /// A fresh clone in the cache directory; removed after install.
    Cloned(PathBuf),
}

impl SourceTree {
    pub fn path(&self) -> &Path {
        match self {
            SourceTree::Local(path) | SourceTree::Cloned(path) => path,
        }
    }
}

pub struct AppBuilder<'a, R: Runtime> {
    runtime: &'a R,
    manifest: &'a Manifest,
    destdir: Option<PathBuf>,
}

impl<'a, R: Runtime> AppBuilder<'a, R> {
    pub fn new(runtime: &'a R, manifest: &'a Manifest) -> Self {
        Self {
            runtime,
            manifest,
            destdir: None,
        }
    }

    /// Install the wheel under a staging root instead of `/`.
    pub fn with_destdir(mut self, destdir: Option<PathBuf>) -> Self {
        self.destdir = destdir;
        self
    }

    fn clone_dir(&self) -> PathBuf {
        self.runtime
            .cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("viu-setup")
            .join(&self.manifest.app)
    }

    /// Use `local` when given, otherwise clone the repository.
    #[tracing::instrument(skip(self))]
    pub fn prepare_source(&self, local: Option<&Path>) -> Result<SourceTree, SetupError> {
        if let Some(dir) = local {
            if !self.runtime.is_dir(dir) {
                return Err(SetupError::Config(format!(
                    "Source directory {} does not exist",
                    dir.display()
                )));
            }
            debug!("Using local source tree {:?}", dir);
            return Ok(SourceTree::Local(dir.to_path_buf()));
        }

        let dir = self.clone_dir();
        if self.runtime.exists(&dir) {
            debug!("Removing stale checkout {:?}", dir);
            self.runtime
                .remove_dir_all(&dir)
                .map_err(|e| SetupError::resource("failed to clear", &dir, e))?;
        }
        if let Some(parent) = dir.parent() {
            self.runtime
                .create_dir_all(parent)
                .map_err(|e| SetupError::resource("failed to create", parent, e))?;
        }

        println!("Cloning {}...", self.manifest.repository);
        self.runtime.run(
            &CommandSpec::new("git")
                .args(["clone", "--depth", "1"])
                .arg(self.manifest.repository.as_str())
                .path_arg(&dir),
        )?;
        Ok(SourceTree::Cloned(dir))
    }

    /// Build a wheel into an emptied `dist/` and return it.
    #[tracing::instrument(skip(self))]
    pub fn build_wheel(&self, source: &Path) -> Result<PathBuf, SetupError> {
        let dist = source.join("dist");
        if self.runtime.exists(&dist) {
            debug!("Removing previous build output {:?}", dist);
            self.runtime
                .remove_dir_all(&dist)
                .map_err(|e| SetupError::resource("failed to clear", &dist, e))?;
        }

        println!("Building {}...", self.manifest.app);
        self.runtime.run(
            &CommandSpec::new("python")
                .args(["-m", "build", "--wheel", "--no-isolation"])
                .current_dir(source),
        )?;

        let entries = self
            .runtime
            .read_dir(&dist)
            .map_err(|e| SetupError::resource("failed to read", &dist, e))?;
        entries
            .into_iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == "whl"))
            .max()
            .ok_or_else(|| {
                SetupError::Config(format!("No wheel was produced in {}", dist.display()))
            })
    }

    /// Install the wheel system-wide (or under the staging root).
    #[tracing::instrument(skip(self))]
    pub fn install_wheel(&self, wheel: &Path) -> Result<(), SetupError> {
        let mut command = CommandSpec::new("python").args(["-m", "installer"]);
        let elevate = match &self.destdir {
            Some(destdir) => {
                command = command.arg("--destdir").path_arg(destdir);
                !self.runtime.is_privileged() && !self.runtime.can_write(destdir)
            }
            None => true,
        };
        command = command.path_arg(wheel);
        if elevate {
            command = command.elevated();
        }

        println!("Installing {}...", wheel.display());
        self.runtime.run(&command)?;
        Ok(())
    }

    /// Remove a cloned source tree. Local trees are left alone.
    pub fn cleanup(&self, source: &SourceTree) {
        if let SourceTree::Cloned(dir) = source {
            if let Err(e) = self.runtime.remove_dir_all(dir) {
                warn!("Failed to clean up {:?}: {}", dir, e);
            }
        }
    }
}
